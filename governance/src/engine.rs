//! Core governance engine: drives proposals through the session lifecycle.
//!
//! Every mutating call runs against a working copy of the engine state and
//! commits it, together with the events it produced, only if the whole call
//! succeeds. A rejected call leaves no trace.

use crate::clock::{self, SessionWindow};
use crate::config::GovernanceConfig;
use crate::delegation::DelegationRegistry;
use crate::error::GovernanceError;
use crate::events::GovernanceEvent;
use crate::ports::{AssetLock, ExternalCaller, WeightSource};
use crate::proposal::{Proposal, ProposalDraft, Resolution};
use crate::requirements::{Requirement, RequirementRegistry, RequirementUpdate};
use crate::roles::{Role, RoleRegistry};
use crate::rule::SessionRule;
use crate::session::{ProposalId, Session, SessionId, SessionState, SessionStore};
use crate::snapshot::GovernanceSnapshot;
use agora_types::{Address, Selector, Timestamp};
use std::collections::HashMap;

/// Everything a call may change. Cloned at the start of each mutating call.
#[derive(Clone, Debug)]
struct EngineState {
    rule: SessionRule,
    requirements: RequirementRegistry,
    sessions: SessionStore,
    delegation: DelegationRegistry,
    roles: RoleRegistry,
    /// Holder → last session it voted in.
    last_votes: HashMap<Address, SessionId>,
}

/// The voting engine.
///
/// `L` supplies weights and transfer locks for the governed asset; `X`
/// carries out `Resolution::ExternalCall`s.
pub struct GovernanceEngine<L, X> {
    /// The engine's own address: the lock exception and the target of
    /// in-process resolutions.
    address: Address,
    /// The governed asset, scope of the voting-window transfer lock.
    asset: Address,
    state: EngineState,
    pending_events: Vec<GovernanceEvent>,
    ledger: L,
    caller: X,
}

impl<L, X> GovernanceEngine<L, X>
where
    L: WeightSource + AssetLock,
    X: ExternalCaller,
{
    pub fn new(config: &GovernanceConfig, ledger: L, caller: X) -> Result<Self, GovernanceError> {
        config.validate()?;
        let mut requirements = RequirementRegistry::new(config.default_requirement)?;
        requirements.apply(&config.requirements)?;
        Ok(Self {
            address: config.address,
            asset: config.asset,
            state: EngineState {
                rule: config.session_rule.clone(),
                requirements,
                sessions: SessionStore::new(),
                delegation: DelegationRegistry::new(),
                roles: RoleRegistry::new(
                    config.operators.iter().copied(),
                    config.configurators.iter().copied(),
                ),
                last_votes: HashMap::new(),
            },
            pending_events: Vec::new(),
            ledger,
            caller,
        })
    }

    /// Rebuild an engine from a snapshot taken by [`GovernanceEngine::snapshot`].
    /// Inconsistent snapshots are refused.
    pub fn restore(
        snapshot: GovernanceSnapshot,
        ledger: L,
        caller: X,
    ) -> Result<Self, GovernanceError> {
        snapshot.validate()?;
        Ok(Self {
            address: snapshot.address,
            asset: snapshot.asset,
            state: EngineState {
                rule: snapshot.rule,
                requirements: snapshot.requirements,
                sessions: snapshot.sessions,
                delegation: DelegationRegistry::from_snapshot(snapshot.delegation),
                roles: snapshot.roles,
                last_votes: snapshot.last_votes.into_iter().collect(),
            },
            pending_events: Vec::new(),
            ledger,
            caller,
        })
    }

    /// Run `op` on a working copy of the state; commit only on success.
    fn atomic<T>(
        &mut self,
        op: impl FnOnce(&mut Transition<'_, L, X>) -> Result<T, GovernanceError>,
    ) -> Result<T, GovernanceError> {
        let mut state = self.state.clone();
        let mut events = Vec::new();
        let result = op(&mut Transition {
            address: self.address,
            asset: self.asset,
            state: &mut state,
            events: &mut events,
            ledger: &mut self.ledger,
            caller: &mut self.caller,
        });
        match result {
            Ok(out) => {
                self.state = state;
                self.pending_events.append(&mut events);
                Ok(out)
            }
            Err(e) => {
                tracing::debug!(code = e.code(), error = %e, "call rejected");
                Err(e)
            }
        }
    }

    // ── Proposals ────────────────────────────────────────────────────────

    /// Define a proposal in the nearest session that is still planned,
    /// scheduling a new session if needed.
    pub fn define_proposal(
        &mut self,
        caller: &Address,
        draft: ProposalDraft,
        now: Timestamp,
    ) -> Result<(SessionId, ProposalId), GovernanceError> {
        self.atomic(|tx| tx.define_proposal(caller, draft, now))
    }

    /// Replace a proposal's content. Proposer only, before voting starts.
    pub fn update_proposal(
        &mut self,
        caller: &Address,
        session_id: SessionId,
        proposal_id: ProposalId,
        draft: ProposalDraft,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.atomic(|tx| tx.update_proposal(caller, session_id, proposal_id, draft, now))
    }

    /// Cancel a proposal. Proposer only, before voting starts.
    pub fn cancel_proposal(
        &mut self,
        caller: &Address,
        session_id: SessionId,
        proposal_id: ProposalId,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.atomic(|tx| tx.cancel_proposal(caller, session_id, proposal_id, now))
    }

    // ── Delegation ───────────────────────────────────────────────────────

    /// Set the caller's delegate; the null address clears it.
    pub fn define_delegate(
        &mut self,
        caller: &Address,
        delegate: &Address,
    ) -> Result<(), GovernanceError> {
        self.atomic(|tx| {
            tx.state.delegation.define_delegate(caller, delegate)?;
            tx.events.push(GovernanceEvent::DelegateDefined {
                voter: *caller,
                delegate: *delegate,
            });
            Ok(())
        })
    }

    /// Opt in to (or out of) being the only one who may cast the caller's weight.
    pub fn define_self_managed(
        &mut self,
        caller: &Address,
        self_managed: bool,
    ) -> Result<(), GovernanceError> {
        self.atomic(|tx| {
            tx.state.delegation.set_self_managed(caller, self_managed);
            tx.events.push(GovernanceEvent::SelfManagedDefined {
                holder: *caller,
                self_managed,
            });
            Ok(())
        })
    }

    // ── Voting ───────────────────────────────────────────────────────────

    /// Vote with the caller's own weight. Bit `i` of `selection` approves
    /// proposal `i + 1` of the current session.
    pub fn submit_vote(
        &mut self,
        caller: &Address,
        selection: u128,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.atomic(|tx| tx.submit_votes(caller, std::slice::from_ref(caller), selection, now))
    }

    /// Vote with the weight of each of `holders`, as holder, delegate, or operator.
    pub fn submit_vote_on_behalf(
        &mut self,
        caller: &Address,
        holders: &[Address],
        selection: u128,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.atomic(|tx| tx.submit_votes(caller, holders, selection, now))
    }

    /// Does the proposal pass both majority and quorum right now?
    ///
    /// The total supply is read live from the weight source. Cancelled
    /// proposals never pass.
    pub fn is_approved(
        &self,
        session_id: SessionId,
        proposal_id: ProposalId,
    ) -> Result<bool, GovernanceError> {
        approval(&self.state, &self.ledger, self.address, session_id, proposal_id)
    }

    // ── Execution ────────────────────────────────────────────────────────

    /// Execute the resolutions of approved proposals of the current session,
    /// in the given order. Only during grace.
    pub fn execute_resolutions(
        &mut self,
        caller: &Address,
        proposal_ids: &[ProposalId],
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.atomic(|tx| tx.execute_resolutions(caller, proposal_ids, now))
    }

    // ── Configuration ────────────────────────────────────────────────────

    pub fn update_session_rule(
        &mut self,
        caller: &Address,
        rule: SessionRule,
    ) -> Result<(), GovernanceError> {
        self.atomic(|tx| {
            tx.state.roles.require_configurator(caller)?;
            tx.apply_session_rule(rule)
        })
    }

    /// Write one requirement per index of the parallel arrays, all or nothing.
    pub fn update_resolution_requirements(
        &mut self,
        caller: &Address,
        targets: &[Address],
        selectors: &[Selector],
        majorities: &[u8],
        quorums: &[u8],
    ) -> Result<(), GovernanceError> {
        self.atomic(|tx| {
            tx.state.roles.require_configurator(caller)?;
            let updates =
                RequirementUpdate::from_parallel(targets, selectors, majorities, quorums)?;
            tx.apply_requirements(&updates)
        })
    }

    pub fn grant_role(
        &mut self,
        caller: &Address,
        role: Role,
        account: Address,
    ) -> Result<(), GovernanceError> {
        self.atomic(|tx| {
            tx.state.roles.require_configurator(caller)?;
            if tx.state.roles.grant(role, account) {
                tx.events
                    .push(GovernanceEvent::RoleGranted { role, account });
            }
            Ok(())
        })
    }

    pub fn revoke_role(
        &mut self,
        caller: &Address,
        role: Role,
        account: Address,
    ) -> Result<(), GovernanceError> {
        self.atomic(|tx| {
            tx.state.roles.require_configurator(caller)?;
            if tx.state.roles.revoke(role, &account)? {
                tx.events
                    .push(GovernanceEvent::RoleRevoked { role, account });
            }
            Ok(())
        })
    }
}

impl<L, X> GovernanceEngine<L, X>
where
    L: WeightSource,
{
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn asset(&self) -> Address {
        self.asset
    }

    pub fn session_rule(&self) -> &SessionRule {
        &self.state.rule
    }

    pub fn resolution_requirement(&self, target: &Address, selector: &Selector) -> Requirement {
        self.state.requirements.requirement(target, selector)
    }

    pub fn next_session_at(&self, now: Timestamp) -> Timestamp {
        clock::next_session_at(&self.state.rule, now)
    }

    /// Most recent session whose campaign has started, whatever its state.
    pub fn current_session(&self, now: Timestamp) -> Option<SessionId> {
        self.state.sessions.current(now)
    }

    pub fn session(&self, id: SessionId) -> Result<&Session, GovernanceError> {
        self.state.sessions.get(id)
    }

    pub fn sessions(&self) -> &[Session] {
        self.state.sessions.sessions()
    }

    pub fn session_state(
        &self,
        id: SessionId,
        now: Timestamp,
    ) -> Result<SessionState, GovernanceError> {
        Ok(self.state.sessions.get(id)?.state_at(now))
    }

    pub fn proposal(
        &self,
        session_id: SessionId,
        proposal_id: ProposalId,
    ) -> Result<&Proposal, GovernanceError> {
        self.state.sessions.proposal(session_id, proposal_id)
    }

    pub fn proposals(&self, session_id: SessionId) -> impl Iterator<Item = &Proposal> {
        self.state.sessions.proposals(session_id)
    }

    pub fn delegate_of(&self, holder: &Address) -> Option<Address> {
        self.state.delegation.delegate_of(holder).copied()
    }

    pub fn delegators_of(&self, delegate: &Address) -> Vec<Address> {
        self.state.delegation.delegators_of(delegate)
    }

    pub fn is_self_managed(&self, holder: &Address) -> bool {
        self.state.delegation.is_self_managed(holder)
    }

    /// Last session the holder voted in.
    pub fn last_vote_of(&self, holder: &Address) -> Option<SessionId> {
        self.state.last_votes.get(holder).copied()
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.state.roles.has_role(role, account)
    }

    pub fn is_operator(&self, account: &Address) -> bool {
        self.state.roles.is_operator(account)
    }

    pub fn is_configurator(&self, account: &Address) -> bool {
        self.state.roles.is_configurator(account)
    }

    /// Events committed since the last drain, oldest first.
    pub fn pending_events(&self) -> &[GovernanceEvent] {
        &self.pending_events
    }

    pub fn drain_events(&mut self) -> Vec<GovernanceEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn external_caller(&self) -> &X {
        &self.caller
    }

    pub fn external_caller_mut(&mut self) -> &mut X {
        &mut self.caller
    }

    pub fn snapshot(&self) -> GovernanceSnapshot {
        let mut last_votes: Vec<(Address, SessionId)> =
            self.state.last_votes.iter().map(|(k, v)| (*k, *v)).collect();
        last_votes.sort();
        GovernanceSnapshot {
            address: self.address,
            asset: self.asset,
            rule: self.state.rule.clone(),
            requirements: self.state.requirements.clone(),
            sessions: self.state.sessions.clone(),
            delegation: self.state.delegation.snapshot(),
            roles: self.state.roles.clone(),
            last_votes,
        }
    }
}

/// Majority and quorum of one proposal against the requirement of its resolution.
fn approval<L: WeightSource>(
    state: &EngineState,
    ledger: &L,
    engine: Address,
    session_id: SessionId,
    proposal_id: ProposalId,
) -> Result<bool, GovernanceError> {
    let session = state.sessions.get(session_id)?;
    let proposal = state.sessions.proposal(session_id, proposal_id)?;
    if proposal.cancelled {
        return Ok(false);
    }
    let (target, selector) = proposal.resolution.requirement_key(engine);
    let requirement = state.requirements.requirement(&target, &selector);
    Ok(requirement.is_met(
        proposal.approvals,
        session.participation,
        ledger.total_supply(),
    ))
}

/// One call's view of the engine: the working state plus the collaborators.
struct Transition<'a, L, X> {
    address: Address,
    asset: Address,
    state: &'a mut EngineState,
    events: &'a mut Vec<GovernanceEvent>,
    ledger: &'a mut L,
    caller: &'a mut X,
}

impl<L, X> Transition<'_, L, X>
where
    L: WeightSource + AssetLock,
    X: ExternalCaller,
{
    fn define_proposal(
        &mut self,
        caller: &Address,
        draft: ProposalDraft,
        now: Timestamp,
    ) -> Result<(SessionId, ProposalId), GovernanceError> {
        let operator = self.state.roles.is_operator(caller);
        let weight = self.ledger.weight_of(caller);
        let need = self.state.rule.new_proposal_threshold;
        if !operator && weight < need {
            return Err(GovernanceError::BelowProposalThreshold { have: weight, need });
        }
        draft.resolution.validate()?;

        let session_id = match self.state.sessions.planned(now) {
            Some(id) => id,
            None => self.schedule_session(now)?,
        };
        let cap = self.state.rule.proposal_cap(operator);
        let proposal_id =
            self.state
                .sessions
                .add_proposal(session_id, *caller, weight, draft, now, cap)?;

        tracing::info!(session_id, proposal_id, proposer = %caller, "proposal defined");
        self.events.push(GovernanceEvent::ProposalDefined {
            session_id,
            proposal_id,
        });
        Ok((session_id, proposal_id))
    }

    /// Open the next session on the grid, after the previous one closes, and
    /// lock the asset for its voting window.
    fn schedule_session(&mut self, now: Timestamp) -> Result<SessionId, GovernanceError> {
        let reference = match self.state.sessions.last() {
            Some(prev) => now.max(prev.closed_at.minus(1)),
            None => now,
        };
        let window: SessionWindow = clock::next_window(&self.state.rule, reference);
        self.ledger
            .lock(&self.asset, window.vote_at, window.grace_at, &[self.address])
            .map_err(|reason| {
                tracing::warn!(%reason, vote_at = %window.vote_at, "asset lock rejected");
                GovernanceError::LockRejected(reason)
            })?;
        let session_id = self.state.sessions.schedule(window);

        tracing::info!(
            session_id,
            campaign_at = %window.campaign_at,
            vote_at = %window.vote_at,
            grace_at = %window.grace_at,
            closed_at = %window.closed_at,
            "session scheduled"
        );
        self.events.push(GovernanceEvent::SessionScheduled {
            session_id,
            vote_at: window.vote_at,
        });
        Ok(session_id)
    }

    /// Shared guard of update and cancel: proposer only, live, not yet voting.
    fn editable_proposal(
        &mut self,
        caller: &Address,
        session_id: SessionId,
        proposal_id: ProposalId,
        now: Timestamp,
    ) -> Result<&mut Proposal, GovernanceError> {
        let state = self.state.sessions.get(session_id)?.state_at(now);
        let proposal = self.state.sessions.proposal_mut(session_id, proposal_id)?;
        if proposal.proposed_by != *caller {
            return Err(GovernanceError::NotProposer {
                session_id,
                proposal_id,
            });
        }
        if proposal.cancelled {
            return Err(GovernanceError::ProposalCancelled {
                session_id,
                proposal_id,
            });
        }
        if !matches!(state, SessionState::Planned | SessionState::Campaign) {
            return Err(GovernanceError::ProposalFrozen { session_id, state });
        }
        Ok(proposal)
    }

    fn update_proposal(
        &mut self,
        caller: &Address,
        session_id: SessionId,
        proposal_id: ProposalId,
        draft: ProposalDraft,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        draft.resolution.validate()?;
        self.editable_proposal(caller, session_id, proposal_id, now)?
            .apply_draft(draft);
        tracing::info!(session_id, proposal_id, "proposal updated");
        self.events.push(GovernanceEvent::ProposalUpdated {
            session_id,
            proposal_id,
        });
        Ok(())
    }

    fn cancel_proposal(
        &mut self,
        caller: &Address,
        session_id: SessionId,
        proposal_id: ProposalId,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.editable_proposal(caller, session_id, proposal_id, now)?
            .cancelled = true;
        tracing::info!(session_id, proposal_id, "proposal cancelled");
        self.events.push(GovernanceEvent::ProposalCancelled {
            session_id,
            proposal_id,
        });
        Ok(())
    }

    fn submit_votes(
        &mut self,
        caller: &Address,
        holders: &[Address],
        selection: u128,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        if holders.is_empty() {
            return Err(GovernanceError::EmptyHolderList);
        }
        let session_id = self
            .state
            .sessions
            .current(now)
            .ok_or(GovernanceError::NoActiveSession)?;
        let state = self.state.sessions.get(session_id)?.state_at(now);
        if state != SessionState::Voting {
            return Err(GovernanceError::NotVoting { session_id, state });
        }
        self.state.sessions.check_selection(session_id, selection)?;

        let operator = self.state.roles.is_operator(caller);
        for holder in holders {
            self.state.delegation.authorize(caller, holder, operator)?;
            if self.state.last_votes.get(holder) == Some(&session_id) {
                return Err(GovernanceError::AlreadyVoted {
                    holder: *holder,
                    session_id,
                });
            }
            let weight = self.ledger.weight_of(holder);
            if weight == 0 {
                return Err(GovernanceError::NoVotingWeight(*holder));
            }
            self.state
                .sessions
                .record_vote(session_id, selection, weight)?;
            self.state.last_votes.insert(*holder, session_id);

            tracing::debug!(
                session_id,
                voter = %holder,
                by = %caller,
                weight,
                selection,
                "vote recorded"
            );
            self.events.push(GovernanceEvent::Vote {
                session_id,
                voter: *holder,
                weight,
            });
        }
        Ok(())
    }

    fn execute_resolutions(
        &mut self,
        caller: &Address,
        proposal_ids: &[ProposalId],
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        if proposal_ids.is_empty() {
            return Err(GovernanceError::EmptyResolutionList);
        }
        let session_id = self
            .state
            .sessions
            .current(now)
            .ok_or(GovernanceError::NoActiveSession)?;
        match self.state.sessions.get(session_id)?.state_at(now) {
            SessionState::Grace => {}
            SessionState::Closed => return Err(GovernanceError::SessionClosed(session_id)),
            state => return Err(GovernanceError::NotInGrace { session_id, state }),
        }

        let operator = self.state.roles.is_operator(caller);
        let weight = self.ledger.weight_of(caller);
        let need = self.state.rule.execute_resolution_threshold;
        if !operator && weight < need {
            return Err(GovernanceError::BelowExecutionThreshold { have: weight, need });
        }

        for &proposal_id in proposal_ids {
            let proposal = self.state.sessions.proposal(session_id, proposal_id)?;
            if proposal.resolution_executed {
                return Err(GovernanceError::AlreadyExecuted {
                    session_id,
                    proposal_id,
                });
            }
            if proposal.cancelled {
                return Err(GovernanceError::ProposalCancelled {
                    session_id,
                    proposal_id,
                });
            }
            let resolution = proposal.resolution.clone();
            // Re-evaluated per proposal: an earlier resolution in this call
            // may have changed the requirements.
            if !approval(&*self.state, &*self.ledger, self.address, session_id, proposal_id)? {
                return Err(GovernanceError::NotApproved {
                    session_id,
                    proposal_id,
                });
            }

            self.dispatch(session_id, proposal_id, &resolution)?;
            self.state
                .sessions
                .proposal_mut(session_id, proposal_id)?
                .resolution_executed = true;

            tracing::info!(session_id, proposal_id, executor = %caller, "resolution executed");
            self.events.push(GovernanceEvent::ResolutionExecuted {
                session_id,
                proposal_id,
                resolution,
            });
        }
        Ok(())
    }

    fn dispatch(
        &mut self,
        session_id: SessionId,
        proposal_id: ProposalId,
        resolution: &Resolution,
    ) -> Result<(), GovernanceError> {
        match resolution {
            Resolution::None => Err(GovernanceError::NoResolution {
                session_id,
                proposal_id,
            }),
            Resolution::UpdateSessionRule(rule) => self.apply_session_rule(rule.clone()),
            Resolution::UpdateRequirements(updates) => self.apply_requirements(updates),
            Resolution::ExternalCall { target, payload } => {
                self.caller.invoke(target, payload).map_err(|reason| {
                    tracing::warn!(session_id, proposal_id, callee = %target, %reason, "external call failed");
                    GovernanceError::ResolutionFailed {
                        session_id,
                        proposal_id,
                        reason,
                    }
                })
            }
        }
    }

    fn apply_session_rule(&mut self, rule: SessionRule) -> Result<(), GovernanceError> {
        rule.validate()?;
        tracing::info!(?rule, "session rule updated");
        self.state.rule = rule.clone();
        self.events
            .push(GovernanceEvent::SessionRuleUpdated { rule });
        Ok(())
    }

    fn apply_requirements(&mut self, updates: &[RequirementUpdate]) -> Result<(), GovernanceError> {
        self.state.requirements.apply(updates)?;
        for update in updates {
            tracing::info!(
                scope = %update.target,
                selector = %update.selector,
                majority = update.majority,
                quorum = update.quorum,
                "resolution requirement updated"
            );
            self.events
                .push(GovernanceEvent::ResolutionRequirementUpdated {
                    target: update.target,
                    selector: update.selector,
                    majority: update.majority,
                    quorum: update.quorum,
                });
        }
        Ok(())
    }
}
