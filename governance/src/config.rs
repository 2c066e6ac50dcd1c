//! Engine configuration.
//!
//! Loaded from a TOML file via [`GovernanceConfig::from_toml_file`] or
//! [`GovernanceConfig::from_toml_str`]. Everything except the two addresses
//! has a default, so a minimal file names just `address` and `asset`.

use crate::error::GovernanceError;
use crate::requirements::{Requirement, RequirementUpdate};
use crate::rule::SessionRule;
use agora_types::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// The engine's own address.
    pub address: Address,
    /// The governed asset whose weights count and whose transfers are
    /// locked while voting.
    pub asset: Address,
    /// Accounts that bypass thresholds and may vote on anyone's behalf.
    #[serde(default)]
    pub operators: Vec<Address>,
    /// Accounts that may change the rule, requirements and roles directly.
    #[serde(default)]
    pub configurators: Vec<Address>,
    #[serde(default)]
    pub session_rule: SessionRule,
    /// Requirement used when no specific entry matches.
    #[serde(default)]
    pub default_requirement: Requirement,
    /// Initial per-action requirements.
    #[serde(default)]
    pub requirements: Vec<RequirementUpdate>,
}

impl GovernanceConfig {
    pub fn new(address: Address, asset: Address) -> Self {
        Self {
            address,
            asset,
            operators: Vec::new(),
            configurators: Vec::new(),
            session_rule: SessionRule::default(),
            default_requirement: Requirement::default(),
            requirements: Vec::new(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, GovernanceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| GovernanceError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        let config: Self = toml::from_str(s).map_err(|e| GovernanceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, GovernanceError> {
        toml::to_string_pretty(self).map_err(|e| GovernanceError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), GovernanceError> {
        for (field, addr) in [("address", &self.address), ("asset", &self.asset)] {
            if addr.is_zero() || *addr == Address::WILDCARD {
                return Err(GovernanceError::Config(format!(
                    "{field} must be a concrete address, got {addr}"
                )));
            }
        }
        if self.configurators.is_empty() {
            tracing::warn!("no configurators: rule and requirements change only by resolution");
        }
        self.session_rule.validate()?;
        self.default_requirement.validate()?;
        self.requirements
            .iter()
            .try_for_each(RequirementUpdate::validate)
    }
}
