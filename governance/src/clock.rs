//! Session clock: maps a timestamp to the next aligned session.
//!
//! Sessions sit on a fixed grid of period `L = campaign + voting + grace`,
//! shifted by `period_offset`. Grid points are vote starts; a session's
//! campaign opens `campaign_period` before its grid point and it closes
//! exactly where the next session's campaign opens, so sessions scheduled
//! on the same grid never overlap.

use crate::rule::SessionRule;
use agora_types::Timestamp;
use serde::{Deserialize, Serialize};

/// The four boundaries of one session, all derived from its vote start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub campaign_at: Timestamp,
    pub vote_at: Timestamp,
    pub grace_at: Timestamp,
    pub closed_at: Timestamp,
}

impl SessionWindow {
    /// The window of a session whose voting starts at `vote_at`.
    pub fn from_vote_at(rule: &SessionRule, vote_at: Timestamp) -> Self {
        let grace_at = vote_at.plus(rule.voting_period);
        Self {
            campaign_at: vote_at.minus(rule.campaign_period),
            vote_at,
            grace_at,
            closed_at: grace_at.plus(rule.grace_period),
        }
    }
}

/// Smallest grid point whose campaign start lies strictly after `reference`.
///
/// When `reference` falls inside a session's campaign, voting, or grace
/// window, that session's grid point is already too early and the following
/// one is returned.
pub fn next_session_at(rule: &SessionRule, reference: Timestamp) -> Timestamp {
    let period = rule.session_period().max(1);
    let earliest_vote = reference.as_secs().saturating_add(rule.campaign_period);
    if earliest_vote < rule.period_offset {
        return Timestamp::new(rule.period_offset);
    }
    let steps = (earliest_vote - rule.period_offset) / period + 1;
    Timestamp::new(
        rule.period_offset
            .saturating_add(steps.saturating_mul(period)),
    )
}

/// Window of the next session after `reference`.
pub fn next_window(rule: &SessionRule, reference: Timestamp) -> SessionWindow {
    SessionWindow::from_vote_at(rule, next_session_at(rule, reference))
}
