use crate::session::{ProposalId, SessionId, SessionState};
use agora_types::{Address, Selector};
use thiserror::Error;

/// Broad class of a rejected call, for hosts that map failures to responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller lacks the weight, role, or delegation the call needs.
    Authorization,
    /// The call arrived outside the session state it is valid in.
    Temporal,
    /// Malformed input or a reference to something that does not exist.
    Validity,
    /// The call would repeat an effect that may only happen once.
    Idempotence,
    /// A configuration value exceeds its absolute bounds.
    Configuration,
    /// An external collaborator refused the request.
    Collaborator,
}

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("caller weight {have} is below the proposal threshold {need}")]
    BelowProposalThreshold { have: u128, need: u128 },

    #[error("caller weight {have} is below the execution threshold {need}")]
    BelowExecutionThreshold { have: u128, need: u128 },

    #[error("only the proposer can change proposal {session_id}/{proposal_id}")]
    NotProposer {
        session_id: SessionId,
        proposal_id: ProposalId,
    },

    #[error("{caller} may not vote with the weight of {holder}")]
    NotAuthorizedForHolder { caller: Address, holder: Address },

    #[error("holder {0} is self-managed and only votes for itself")]
    SelfManagedHolder(Address),

    #[error("{0} is not a configurator")]
    NotConfigurator(Address),

    #[error("session {session_id} is {state:?}, proposals can only join a planned session")]
    SessionNotPlanned {
        session_id: SessionId,
        state: SessionState,
    },

    #[error("session {session_id} is {state:?}, its proposals are frozen")]
    ProposalFrozen {
        session_id: SessionId,
        state: SessionState,
    },

    #[error("no session has started yet")]
    NoActiveSession,

    #[error("session {session_id} is {state:?}, votes are only accepted while voting")]
    NotVoting {
        session_id: SessionId,
        state: SessionState,
    },

    #[error("session {session_id} is {state:?}, resolutions execute only during grace")]
    NotInGrace {
        session_id: SessionId,
        state: SessionState,
    },

    #[error("session {0} is closed")]
    SessionClosed(SessionId),

    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    #[error("proposal {session_id}/{proposal_id} not found")]
    ProposalNotFound {
        session_id: SessionId,
        proposal_id: ProposalId,
    },

    #[error("no holders given")]
    EmptyHolderList,

    #[error("selection bit {bit} is beyond the {proposals_count} proposals of the session")]
    SelectionOutOfRange { bit: u32, proposals_count: u32 },

    #[error("parallel arrays differ in length")]
    LengthMismatch,

    #[error("percentage {0} is outside 0..=100")]
    PercentageOutOfRange(u8),

    #[error("selector {selector} of target {target} is reserved")]
    ReservedSelector { target: Address, selector: Selector },

    #[error("session {session_id} already holds its maximum of {cap} proposals")]
    ProposalCapReached { session_id: SessionId, cap: u32 },

    #[error("cannot delegate to self")]
    SelfDelegation,

    #[error("holder {0} has no voting weight")]
    NoVotingWeight(Address),

    #[error("no proposals given")]
    EmptyResolutionList,

    #[error("proposal {session_id}/{proposal_id} carries no resolution")]
    NoResolution {
        session_id: SessionId,
        proposal_id: ProposalId,
    },

    #[error("resolution target must not be the null address")]
    NullResolutionTarget,

    #[error("proposal {session_id}/{proposal_id} is not approved")]
    NotApproved {
        session_id: SessionId,
        proposal_id: ProposalId,
    },

    #[error("cannot revoke the last configurator {0}")]
    LastConfigurator(Address),

    #[error("holder {holder} already voted in session {session_id}")]
    AlreadyVoted {
        holder: Address,
        session_id: SessionId,
    },

    #[error("resolution of proposal {session_id}/{proposal_id} was already executed")]
    AlreadyExecuted {
        session_id: SessionId,
        proposal_id: ProposalId,
    },

    #[error("proposal {session_id}/{proposal_id} is cancelled")]
    ProposalCancelled {
        session_id: SessionId,
        proposal_id: ProposalId,
    },

    #[error("{field} = {value} is outside 1..={max}")]
    PeriodOutOfBounds {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("period offset {offset} must be below the session period {period}")]
    OffsetTooLarge { offset: u64, period: u64 },

    #[error("{field} = {value} is outside 1..={max}")]
    ProposalLimitOutOfBounds {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("asset lock rejected: {0}")]
    LockRejected(String),

    #[error("resolution of proposal {session_id}/{proposal_id} failed: {reason}")]
    ResolutionFailed {
        session_id: SessionId,
        proposal_id: ProposalId,
        reason: String,
    },

    #[error("weight arithmetic overflow")]
    Overflow,

    #[error("config error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl GovernanceError {
    /// Stable mnemonic code. Codes are never renumbered or reused.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BelowProposalThreshold { .. } => "GOV01",
            Self::BelowExecutionThreshold { .. } => "GOV02",
            Self::NotProposer { .. } => "GOV03",
            Self::NotAuthorizedForHolder { .. } => "GOV04",
            Self::SelfManagedHolder(_) => "GOV05",
            Self::NotConfigurator(_) => "GOV06",
            Self::SessionNotPlanned { .. } => "GOV07",
            Self::ProposalFrozen { .. } => "GOV08",
            Self::NoActiveSession => "GOV09",
            Self::NotVoting { .. } => "GOV10",
            Self::NotInGrace { .. } => "GOV11",
            Self::SessionClosed(_) => "GOV12",
            Self::SessionNotFound(_) => "GOV13",
            Self::ProposalNotFound { .. } => "GOV14",
            Self::EmptyHolderList => "GOV15",
            Self::SelectionOutOfRange { .. } => "GOV16",
            Self::LengthMismatch => "GOV17",
            Self::PercentageOutOfRange(_) => "GOV18",
            Self::ReservedSelector { .. } => "GOV19",
            Self::ProposalCapReached { .. } => "GOV20",
            Self::SelfDelegation => "GOV21",
            Self::NoVotingWeight(_) => "GOV22",
            Self::EmptyResolutionList => "GOV23",
            Self::NoResolution { .. } => "GOV24",
            Self::NullResolutionTarget => "GOV25",
            Self::NotApproved { .. } => "GOV26",
            Self::LastConfigurator(_) => "GOV27",
            Self::AlreadyVoted { .. } => "GOV28",
            Self::AlreadyExecuted { .. } => "GOV29",
            Self::ProposalCancelled { .. } => "GOV30",
            Self::PeriodOutOfBounds { .. } => "GOV31",
            Self::OffsetTooLarge { .. } => "GOV32",
            Self::ProposalLimitOutOfBounds { .. } => "GOV33",
            Self::LockRejected(_) => "GOV34",
            Self::ResolutionFailed { .. } => "GOV35",
            Self::Overflow => "GOV36",
            Self::Config(_) => "GOV37",
            Self::Snapshot(_) => "GOV38",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BelowProposalThreshold { .. }
            | Self::BelowExecutionThreshold { .. }
            | Self::NotProposer { .. }
            | Self::NotAuthorizedForHolder { .. }
            | Self::SelfManagedHolder(_)
            | Self::NotConfigurator(_) => ErrorKind::Authorization,

            Self::SessionNotPlanned { .. }
            | Self::ProposalFrozen { .. }
            | Self::NoActiveSession
            | Self::NotVoting { .. }
            | Self::NotInGrace { .. }
            | Self::SessionClosed(_) => ErrorKind::Temporal,

            Self::AlreadyVoted { .. }
            | Self::AlreadyExecuted { .. }
            | Self::ProposalCancelled { .. } => ErrorKind::Idempotence,

            Self::PeriodOutOfBounds { .. }
            | Self::OffsetTooLarge { .. }
            | Self::ProposalLimitOutOfBounds { .. } => ErrorKind::Configuration,

            Self::LockRejected(_) | Self::ResolutionFailed { .. } => ErrorKind::Collaborator,

            _ => ErrorKind::Validity,
        }
    }
}
