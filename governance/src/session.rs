//! Session and proposal store.
//!
//! Sessions are created lazily when the first proposal of a new cycle is
//! defined, numbered from 1, and never removed. Proposals are keyed by
//! `(session_id, proposal_id)` with ids numbered from 1 inside each session.

use crate::clock::SessionWindow;
use crate::error::GovernanceError;
use crate::proposal::{Proposal, ProposalDraft};
use agora_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type SessionId = u64;
pub type ProposalId = u32;

/// Where a session stands relative to a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Before the campaign: proposals may still join.
    Planned,
    /// Proposals are public and may be edited or cancelled by their proposer.
    Campaign,
    /// Votes are accepted; proposals are frozen.
    Voting,
    /// Votes are closed; approved resolutions may execute.
    Grace,
    /// Terminal.
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub campaign_at: Timestamp,
    pub vote_at: Timestamp,
    pub grace_at: Timestamp,
    pub closed_at: Timestamp,
    pub proposals_count: u32,
    /// Sum of the weights of every holder who voted in this session.
    pub participation: u128,
}

impl Session {
    fn new(id: SessionId, window: SessionWindow) -> Self {
        Self {
            id,
            campaign_at: window.campaign_at,
            vote_at: window.vote_at,
            grace_at: window.grace_at,
            closed_at: window.closed_at,
            proposals_count: 0,
            participation: 0,
        }
    }

    pub fn state_at(&self, now: Timestamp) -> SessionState {
        if now < self.campaign_at {
            SessionState::Planned
        } else if now < self.vote_at {
            SessionState::Campaign
        } else if now < self.grace_at {
            SessionState::Voting
        } else if now < self.closed_at {
            SessionState::Grace
        } else {
            SessionState::Closed
        }
    }

    pub fn window(&self) -> SessionWindow {
        SessionWindow {
            campaign_at: self.campaign_at,
            vote_at: self.vote_at,
            grace_at: self.grace_at,
            closed_at: self.closed_at,
        }
    }

    /// Mask with one bit set per proposal of this session.
    fn selectable_mask(&self) -> u128 {
        match self.proposals_count {
            0 => 0,
            n if n >= 128 => u128::MAX,
            n => (1u128 << n) - 1,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStore {
    sessions: Vec<Session>,
    #[serde(with = "crate::serde_pairs")]
    proposals: BTreeMap<(SessionId, ProposalId), Proposal>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn last(&self) -> Option<&Session> {
        self.sessions.last()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn get(&self, id: SessionId) -> Result<&Session, GovernanceError> {
        id.checked_sub(1)
            .and_then(|idx| self.sessions.get(idx as usize))
            .ok_or(GovernanceError::SessionNotFound(id))
    }

    fn get_mut(&mut self, id: SessionId) -> Result<&mut Session, GovernanceError> {
        id.checked_sub(1)
            .and_then(|idx| self.sessions.get_mut(idx as usize))
            .ok_or(GovernanceError::SessionNotFound(id))
    }

    /// Most recent session whose campaign has started at `now`.
    pub fn current(&self, now: Timestamp) -> Option<SessionId> {
        self.sessions
            .iter()
            .rev()
            .find(|s| s.campaign_at <= now)
            .map(|s| s.id)
    }

    /// The latest session, if it still accepts proposals at `now`.
    pub fn planned(&self, now: Timestamp) -> Option<SessionId> {
        self.sessions
            .last()
            .filter(|s| s.state_at(now) == SessionState::Planned)
            .map(|s| s.id)
    }

    /// Append a session for `window`. The caller guarantees it starts after
    /// the previous session closes.
    pub fn schedule(&mut self, window: SessionWindow) -> SessionId {
        let id = self.sessions.len() as SessionId + 1;
        self.sessions.push(Session::new(id, window));
        id
    }

    /// Add a proposal to a session that is still planned and below `cap`.
    pub fn add_proposal(
        &mut self,
        session_id: SessionId,
        proposed_by: Address,
        weight: u128,
        draft: ProposalDraft,
        now: Timestamp,
        cap: u32,
    ) -> Result<ProposalId, GovernanceError> {
        let session = self.get_mut(session_id)?;
        let state = session.state_at(now);
        if state != SessionState::Planned {
            return Err(GovernanceError::SessionNotPlanned { session_id, state });
        }
        if session.proposals_count >= cap {
            return Err(GovernanceError::ProposalCapReached { session_id, cap });
        }
        session.proposals_count += 1;
        let proposal_id = session.proposals_count;
        self.proposals.insert(
            (session_id, proposal_id),
            Proposal::from_draft(session_id, proposal_id, proposed_by, weight, draft),
        );
        Ok(proposal_id)
    }

    pub fn proposal(
        &self,
        session_id: SessionId,
        proposal_id: ProposalId,
    ) -> Result<&Proposal, GovernanceError> {
        self.proposals
            .get(&(session_id, proposal_id))
            .ok_or(GovernanceError::ProposalNotFound {
                session_id,
                proposal_id,
            })
    }

    pub(crate) fn proposal_mut(
        &mut self,
        session_id: SessionId,
        proposal_id: ProposalId,
    ) -> Result<&mut Proposal, GovernanceError> {
        self.proposals
            .get_mut(&(session_id, proposal_id))
            .ok_or(GovernanceError::ProposalNotFound {
                session_id,
                proposal_id,
            })
    }

    /// Proposals of one session in id order.
    pub fn proposals(&self, session_id: SessionId) -> impl Iterator<Item = &Proposal> {
        self.proposals
            .range((session_id, 0)..=(session_id, ProposalId::MAX))
            .map(|(_, p)| p)
    }

    /// Check that `selection` only names live proposals of the session.
    pub fn check_selection(
        &self,
        session_id: SessionId,
        selection: u128,
    ) -> Result<(), GovernanceError> {
        let session = self.get(session_id)?;
        let stray = selection & !session.selectable_mask();
        if stray != 0 {
            return Err(GovernanceError::SelectionOutOfRange {
                bit: stray.trailing_zeros(),
                proposals_count: session.proposals_count,
            });
        }
        if let Some(p) = self
            .proposals(session_id)
            .find(|p| p.cancelled && selection & p.selection_bit() != 0)
        {
            return Err(GovernanceError::ProposalCancelled {
                session_id,
                proposal_id: p.id,
            });
        }
        Ok(())
    }

    /// Add one holder's weight to the session participation and to the
    /// approvals of every selected proposal.
    pub fn record_vote(
        &mut self,
        session_id: SessionId,
        selection: u128,
        weight: u128,
    ) -> Result<(), GovernanceError> {
        self.check_selection(session_id, selection)?;
        let session = self.get_mut(session_id)?;
        session.participation = session
            .participation
            .checked_add(weight)
            .ok_or(GovernanceError::Overflow)?;
        for (_, proposal) in self
            .proposals
            .range_mut((session_id, 0)..=(session_id, ProposalId::MAX))
        {
            if selection & proposal.selection_bit() != 0 {
                proposal.approvals = proposal
                    .approvals
                    .checked_add(weight)
                    .ok_or(GovernanceError::Overflow)?;
            }
        }
        Ok(())
    }
}
