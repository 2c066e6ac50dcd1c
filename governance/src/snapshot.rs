//! Point-in-time image of an engine, for hosts that persist state between runs.

use crate::delegation::DelegationSnapshot;
use crate::error::GovernanceError;
use crate::requirements::RequirementRegistry;
use crate::roles::RoleRegistry;
use crate::rule::SessionRule;
use crate::session::{SessionId, SessionStore};
use agora_types::{Address, Selector};
use serde::{Deserialize, Serialize};

/// Everything an engine owns. Collaborators and undrained events are not part of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceSnapshot {
    pub address: Address,
    pub asset: Address,
    pub rule: SessionRule,
    pub requirements: RequirementRegistry,
    pub sessions: SessionStore,
    pub delegation: DelegationSnapshot,
    pub roles: RoleRegistry,
    /// `(holder, session)` pairs in holder order.
    pub last_votes: Vec<(Address, SessionId)>,
}

impl GovernanceSnapshot {
    /// Reject images an engine could not have produced.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        self.rule.validate()?;

        let mut has_default = false;
        for ((target, selector), requirement) in self.requirements.entries() {
            requirement.validate()?;
            if *target == Address::WILDCARD && *selector == Selector::WILDCARD {
                has_default = true;
            } else if selector.is_zero() {
                return Err(GovernanceError::ReservedSelector {
                    target: *target,
                    selector: *selector,
                });
            }
        }
        if !has_default {
            return Err(GovernanceError::Snapshot(
                "global default requirement is missing".into(),
            ));
        }

        let sessions = self.sessions.len() as SessionId;
        if let Some((holder, session_id)) = self
            .last_votes
            .iter()
            .find(|(_, id)| *id == 0 || *id > sessions)
        {
            return Err(GovernanceError::Snapshot(format!(
                "{holder} last voted in session {session_id}, but only {sessions} exist"
            )));
        }
        Ok(())
    }
}

pub fn encode_snapshot(snapshot: &GovernanceSnapshot) -> Result<Vec<u8>, GovernanceError> {
    bincode::serialize(snapshot).map_err(|e| GovernanceError::Snapshot(e.to_string()))
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<GovernanceSnapshot, GovernanceError> {
    bincode::deserialize(bytes).map_err(|e| GovernanceError::Snapshot(e.to_string()))
}
