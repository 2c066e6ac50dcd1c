//! Time-windowed, weight-based governance.
//!
//! Holders of a governed asset define proposals, vote on them with their
//! asset weight (directly or through a delegate), and execute the
//! resolutions of approved proposals. Proposals are grouped into sessions
//! that follow a fixed grid in time:
//!
//! Planned → Campaign → Voting → Grace → Closed
//!
//! Transfers of the asset are locked while a session is voting, so the same
//! weight cannot be counted twice. Whether a proposal passes depends on a
//! majority and a quorum looked up per action it would perform.

pub mod clock;
pub mod config;
pub mod delegation;
pub mod engine;
pub mod error;
pub mod events;
pub mod ports;
pub mod proposal;
pub mod requirements;
pub mod roles;
pub mod rule;
mod serde_pairs;
pub mod session;
pub mod snapshot;

pub use clock::{next_session_at, SessionWindow};
pub use config::GovernanceConfig;
pub use delegation::{DelegationRegistry, DelegationSnapshot};
pub use engine::GovernanceEngine;
pub use error::{ErrorKind, GovernanceError};
pub use events::GovernanceEvent;
pub use ports::{AssetLock, ExternalCaller, WeightSource};
pub use proposal::{Proposal, ProposalDraft, Resolution};
pub use requirements::{Requirement, RequirementRegistry, RequirementUpdate};
pub use roles::{Role, RoleRegistry};
pub use rule::SessionRule;
pub use session::{ProposalId, Session, SessionId, SessionState, SessionStore};
pub use snapshot::{decode_snapshot, encode_snapshot, GovernanceSnapshot};
