//! Proposals and the resolutions they carry.

use crate::error::GovernanceError;
use crate::requirements::RequirementUpdate;
use crate::rule::SessionRule;
use crate::session::{ProposalId, SessionId};
use agora_types::{Address, ContentHash, Selector};
use serde::{Deserialize, Serialize};

/// Signature whose selector keys the requirement of a rule change.
pub const UPDATE_SESSION_RULE_SIGNATURE: &str = "updateSessionRule(SessionRule)";

/// Signature whose selector keys the requirement of a requirement change.
pub const UPDATE_REQUIREMENTS_SIGNATURE: &str =
    "updateResolutionRequirements(address[],bytes4[],uint8[],uint8[])";

/// What executing an approved proposal does.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Signalling proposal: nothing to execute.
    #[default]
    None,
    /// Replace the engine's session rule.
    UpdateSessionRule(SessionRule),
    /// Write resolution requirements.
    UpdateRequirements(Vec<RequirementUpdate>),
    /// Invoke an operation outside the engine.
    ExternalCall { target: Address, payload: Vec<u8> },
}

impl Resolution {
    /// `(target, selector)` under which this resolution's requirement is
    /// looked up. In-process commands are keyed on the engine's own address.
    pub fn requirement_key(&self, engine: Address) -> (Address, Selector) {
        match self {
            Self::None => (Address::ZERO, Selector::ZERO),
            Self::UpdateSessionRule(_) => (
                engine,
                Selector::from_signature(UPDATE_SESSION_RULE_SIGNATURE),
            ),
            Self::UpdateRequirements(_) => (
                engine,
                Selector::from_signature(UPDATE_REQUIREMENTS_SIGNATURE),
            ),
            Self::ExternalCall { target, payload } => (*target, Selector::from_payload(payload)),
        }
    }

    /// Reject resolutions that could never execute, before they are stored.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        match self {
            Self::None => Ok(()),
            Self::UpdateSessionRule(rule) => rule.validate(),
            Self::UpdateRequirements(updates) => {
                updates.iter().try_for_each(RequirementUpdate::validate)
            }
            Self::ExternalCall { target, .. } => {
                if target.is_zero() {
                    Err(GovernanceError::NullResolutionTarget)
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// The caller-supplied part of a proposal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub name: String,
    pub url: String,
    pub hash: ContentHash,
    pub resolution: Resolution,
}

impl ProposalDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_hash(mut self, hash: ContentHash) -> Self {
        self.hash = hash;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }
}

/// A proposal stored in a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub session_id: SessionId,
    /// 1-based within the session; bit `id - 1` of a selection approves it.
    pub id: ProposalId,
    pub name: String,
    pub url: String,
    pub hash: ContentHash,
    pub resolution: Resolution,
    pub proposed_by: Address,
    /// Proposer weight when the proposal was defined.
    pub weight: u128,
    /// Sum of the weights of holders who selected this proposal.
    pub approvals: u128,
    pub resolution_executed: bool,
    pub cancelled: bool,
}

impl Proposal {
    pub(crate) fn from_draft(
        session_id: SessionId,
        id: ProposalId,
        proposed_by: Address,
        weight: u128,
        draft: ProposalDraft,
    ) -> Self {
        Self {
            session_id,
            id,
            name: draft.name,
            url: draft.url,
            hash: draft.hash,
            resolution: draft.resolution,
            proposed_by,
            weight,
            approvals: 0,
            resolution_executed: false,
            cancelled: false,
        }
    }

    pub(crate) fn apply_draft(&mut self, draft: ProposalDraft) {
        self.name = draft.name;
        self.url = draft.url;
        self.hash = draft.hash;
        self.resolution = draft.resolution;
    }

    /// Bit of this proposal in a selection bitmask.
    pub fn selection_bit(&self) -> u128 {
        1u128 << (self.id - 1)
    }
}
