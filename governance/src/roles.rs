//! Privileged roles.

use crate::error::GovernanceError;
use agora_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Bypasses the proposal and execution thresholds, uses the operator
    /// proposal cap, and may vote for holders that are not self-managed.
    Operator,
    /// Changes the session rule, the requirements, and role membership directly.
    Configurator,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRegistry {
    operators: BTreeSet<Address>,
    configurators: BTreeSet<Address>,
}

impl RoleRegistry {
    pub fn new(
        operators: impl IntoIterator<Item = Address>,
        configurators: impl IntoIterator<Item = Address>,
    ) -> Self {
        Self {
            operators: operators.into_iter().collect(),
            configurators: configurators.into_iter().collect(),
        }
    }

    fn members(&self, role: Role) -> &BTreeSet<Address> {
        match role {
            Role::Operator => &self.operators,
            Role::Configurator => &self.configurators,
        }
    }

    fn members_mut(&mut self, role: Role) -> &mut BTreeSet<Address> {
        match role {
            Role::Operator => &mut self.operators,
            Role::Configurator => &mut self.configurators,
        }
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.members(role).contains(account)
    }

    pub fn is_operator(&self, account: &Address) -> bool {
        self.has_role(Role::Operator, account)
    }

    pub fn is_configurator(&self, account: &Address) -> bool {
        self.has_role(Role::Configurator, account)
    }

    pub fn require_configurator(&self, account: &Address) -> Result<(), GovernanceError> {
        if self.is_configurator(account) {
            Ok(())
        } else {
            Err(GovernanceError::NotConfigurator(*account))
        }
    }

    /// Returns false if the account already held the role.
    pub fn grant(&mut self, role: Role, account: Address) -> bool {
        self.members_mut(role).insert(account)
    }

    /// Returns false if the account did not hold the role. The last
    /// configurator cannot be revoked.
    pub fn revoke(&mut self, role: Role, account: &Address) -> Result<bool, GovernanceError> {
        let members = self.members_mut(role);
        if role == Role::Configurator && members.len() == 1 && members.contains(account) {
            return Err(GovernanceError::LastConfigurator(*account));
        }
        Ok(members.remove(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(seed: u8) -> Address {
        Address::new([seed; 20])
    }

    #[test]
    fn grant_and_revoke() {
        let mut roles = RoleRegistry::default();
        assert!(roles.grant(Role::Operator, account(1)));
        assert!(!roles.grant(Role::Operator, account(1)));
        assert!(roles.is_operator(&account(1)));
        assert!(!roles.is_configurator(&account(1)));
        assert!(roles.revoke(Role::Operator, &account(1)).unwrap());
        assert!(!roles.revoke(Role::Operator, &account(1)).unwrap());
    }

    #[test]
    fn last_configurator_stays() {
        let mut roles = RoleRegistry::new([], [account(1), account(2)]);
        roles.revoke(Role::Configurator, &account(1)).unwrap();
        assert!(matches!(
            roles.revoke(Role::Configurator, &account(2)),
            Err(GovernanceError::LastConfigurator(_))
        ));
        assert!(roles.is_configurator(&account(2)));
    }

    #[test]
    fn require_configurator_reports_caller() {
        let roles = RoleRegistry::default();
        assert!(matches!(
            roles.require_configurator(&account(3)),
            Err(GovernanceError::NotConfigurator(a)) if a == account(3)
        ));
    }
}
