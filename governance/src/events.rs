//! Events emitted by the engine for the host to publish.

use crate::proposal::Resolution;
use crate::roles::Role;
use crate::rule::SessionRule;
use crate::session::{ProposalId, SessionId};
use agora_types::{Address, Selector, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceEvent {
    SessionScheduled {
        session_id: SessionId,
        vote_at: Timestamp,
    },
    ProposalDefined {
        session_id: SessionId,
        proposal_id: ProposalId,
    },
    ProposalUpdated {
        session_id: SessionId,
        proposal_id: ProposalId,
    },
    ProposalCancelled {
        session_id: SessionId,
        proposal_id: ProposalId,
    },
    DelegateDefined {
        voter: Address,
        delegate: Address,
    },
    SelfManagedDefined {
        holder: Address,
        self_managed: bool,
    },
    SessionRuleUpdated {
        rule: SessionRule,
    },
    ResolutionRequirementUpdated {
        target: Address,
        selector: Selector,
        majority: u8,
        quorum: u8,
    },
    Vote {
        session_id: SessionId,
        voter: Address,
        weight: u128,
    },
    ResolutionExecuted {
        session_id: SessionId,
        proposal_id: ProposalId,
        resolution: Resolution,
    },
    RoleGranted {
        role: Role,
        account: Address,
    },
    RoleRevoked {
        role: Role,
        account: Address,
    },
}
