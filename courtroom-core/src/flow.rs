//! The courtroom session state machine.
//!
//! `SessionFlowController` carries one session record through the linear screen
//! sequence:
//!
//! ```text
//! ScenarioChosen → RoleChosen → CoachConfigured → CaseConfigured
//!   → StrategyBuilt → RoundActive → RoundConcluded
//! ```
//!
//! Every stage operation reads the persisted record first (failing with
//! `SessionNotFound` when there is none), merges only the fields it owns, and
//! saves the result. Nothing a previous stage wrote is ever cleared; only a new
//! `select_scenario` replaces the record.
//!
//! The live round keeps its runtime state (clock, round counter, outstanding
//! opponent request) in a [`LiveRound`] owned by the controller. Opponent and
//! coach calls are split into a request half and a result half so the host can
//! run the simulated latency off its UI loop.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog;
use crate::clock::{ClockEvent, DebateClock};
use crate::error::{CourtroomError, Result};
use crate::responder::{CoachAdvice, CoachAdvisor, OpponentReply, OpponentResponder};
use crate::scoring::ScoringEngine;
use crate::store::SessionStore;
use crate::types::{
    BadgeRecord, BadgeSummary, CoachConfig, CoachType, Exchange, ExchangeRole, Objective, Role,
    Scenario, SessionRecord, SessionSettings, Stage, Strategy, Verdict,
    OBJECTION_LIMIT_CHOICES, TIME_LIMIT_CHOICES, TOTAL_ROUNDS,
};

/// Why a live round is being concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConclusionReason {
    /// The debate clock ran out.
    TimeExpired,
    /// All rounds were argued and the user delivered a conclusion.
    AllRoundsCompleted,
    /// The user confirmed ending the round early.
    EndedEarly,
}

/// What happened to an opponent reply handed to [`SessionFlowController::accept_opponent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The reply was recorded and the next round is open.
    NextRound(u32),
    /// The reply closed the final round; only a conclusion remains.
    RoundsExhausted,
    /// The round had already concluded (or been replaced); nothing was recorded.
    Discarded,
}

/// An outstanding opponent request created by [`SessionFlowController::submit_argument`].
///
/// The ticket is bound to the live round that issued it; a reply carrying a
/// ticket from an earlier round is discarded.
#[derive(Debug, Clone)]
pub struct PendingExchange {
    pub round: u32,
    pub argument: String,
    pub scenario: &'static Scenario,
    generation: u64,
    transcript_index: usize,
}

impl PendingExchange {
    /// Asks `responder` for the rebuttal to this argument.
    pub async fn send(&self, responder: &dyn OpponentResponder) -> Result<OpponentReply> {
        responder
            .respond(self.round, &self.argument, self.scenario)
            .await
    }
}

/// A coaching request built from the current strategy draft.
#[derive(Debug, Clone)]
pub struct AdviceRequest {
    pub content: String,
    pub coach_type: CoachType,
    pub tone: u8,
}

impl AdviceRequest {
    pub async fn send(&self, advisor: &dyn CoachAdvisor) -> Result<CoachAdvice> {
        advisor.advise(&self.content, self.coach_type, self.tone).await
    }
}

/// Runtime state of the live debate round.
#[derive(Debug)]
pub struct LiveRound {
    record: SessionRecord,
    scenario: &'static Scenario,
    generation: u64,
    clock: DebateClock,
    current_round: u32,
    objections_used: u32,
    awaiting_opponent: bool,
}

impl LiveRound {
    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn scenario(&self) -> &'static Scenario {
        self.scenario
    }

    pub fn clock(&self) -> &DebateClock {
        &self.clock
    }

    pub fn transcript(&self) -> &[Exchange] {
        &self.record.transcript
    }

    /// The 1-based round currently being argued.
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn rounds_completed(&self) -> u32 {
        self.record.rounds_completed.unwrap_or(0)
    }

    pub fn objections_left(&self) -> u32 {
        self.objection_limit().saturating_sub(self.objections_used)
    }

    pub fn awaiting_opponent(&self) -> bool {
        self.awaiting_opponent
    }

    pub fn is_concluded(&self) -> bool {
        self.record.completed
    }

    /// `true` once every round has been argued and only a conclusion remains.
    pub fn can_conclude(&self) -> bool {
        !self.is_concluded() && self.rounds_completed() >= TOTAL_ROUNDS
    }

    /// `true` while the user may submit another argument.
    pub fn accepts_arguments(&self) -> bool {
        !self.is_concluded() && !self.awaiting_opponent && self.rounds_completed() < TOTAL_ROUNDS
    }

    fn objection_limit(&self) -> u32 {
        self.record
            .settings
            .map_or(SessionSettings::default().objection_limit, |s| s.objection_limit)
    }

    /// A copy of the record with one more exchange in the current round.
    fn staged_with(&self, role: ExchangeRole, text: impl Into<String>) -> SessionRecord {
        let mut record = self.record.clone();
        push_exchange(&mut record, role, text, self.current_round);
        record
    }
}

fn push_exchange(record: &mut SessionRecord, role: ExchangeRole, text: impl Into<String>, round: u32) {
    debug!(?role, round, "transcript exchange");
    record.transcript.push(Exchange {
        role,
        text: text.into(),
        round,
    });
}

/// Drives one courtroom session from scenario choice to results.
pub struct SessionFlowController {
    store: Arc<dyn SessionStore>,
    scoring: ScoringEngine,
    opponent: Arc<dyn OpponentResponder>,
    advisor: Arc<dyn CoachAdvisor>,
    live: Option<LiveRound>,
    rounds_started: u64,
}

impl SessionFlowController {
    pub fn new(
        store: Arc<dyn SessionStore>,
        scoring: ScoringEngine,
        opponent: Arc<dyn OpponentResponder>,
        advisor: Arc<dyn CoachAdvisor>,
    ) -> Self {
        Self {
            store,
            scoring,
            opponent,
            advisor,
            live: None,
            rounds_started: 0,
        }
    }

    pub fn opponent(&self) -> Arc<dyn OpponentResponder> {
        Arc::clone(&self.opponent)
    }

    pub fn advisor(&self) -> Arc<dyn CoachAdvisor> {
        Arc::clone(&self.advisor)
    }

    pub fn live(&self) -> Option<&LiveRound> {
        self.live.as_ref()
    }

    /// The persisted record.
    ///
    /// # Errors
    ///
    /// `SessionNotFound` when no session is in progress.
    pub async fn current(&self) -> Result<SessionRecord> {
        self.store
            .load()
            .await?
            .ok_or(CourtroomError::SessionNotFound)
    }

    // -----------------------------------------------------------------------
    // Preparation stages
    // -----------------------------------------------------------------------

    /// Starts a new session for scenario `scenario_id`, replacing any previous record.
    pub async fn select_scenario(&mut self, scenario_id: u32) -> Result<SessionRecord> {
        if catalog::scenario(scenario_id).is_none() {
            return Err(CourtroomError::precondition(
                "select scenario",
                format!("unknown scenario {scenario_id}"),
            ));
        }
        if let Some(mut live) = self.live.take() {
            live.clock.stop();
        }
        let record = SessionRecord::new(scenario_id);
        self.store.save(&record).await?;
        info!(scenario_id, "scenario selected");
        Ok(record)
    }

    pub async fn choose_role(&mut self, role: Role) -> Result<SessionRecord> {
        let mut record = self.editable("choose role").await?;
        record.role = Some(role);
        self.store.save(&record).await?;
        info!(?role, "role chosen");
        Ok(record)
    }

    pub async fn configure_coach(&mut self, coach: CoachConfig) -> Result<SessionRecord> {
        const ACTION: &str = "configure coach";
        let mut record = self.editable(ACTION).await?;
        if record.role.is_none() {
            return Err(refuse(ACTION, "no role has been chosen"));
        }
        if coach.tone > 100 {
            return Err(refuse(ACTION, format!("tone {} is outside 0..=100", coach.tone)));
        }
        record.coach = Some(coach);
        self.store.save(&record).await?;
        info!(coach_type = ?coach.coach_type, tone = coach.tone, "coach configured");
        Ok(record)
    }

    pub async fn configure_case(
        &mut self,
        objective: Objective,
        settings: SessionSettings,
    ) -> Result<SessionRecord> {
        const ACTION: &str = "configure case";
        let mut record = self.editable(ACTION).await?;
        if record.coach.is_none() {
            return Err(refuse(ACTION, "no coach has been configured"));
        }
        if !TIME_LIMIT_CHOICES.contains(&settings.time_limit_minutes) {
            return Err(refuse(
                ACTION,
                format!("time limit {} is not one of {TIME_LIMIT_CHOICES:?}", settings.time_limit_minutes),
            ));
        }
        if !OBJECTION_LIMIT_CHOICES.contains(&settings.objection_limit) {
            return Err(refuse(
                ACTION,
                format!("objection limit {} is not one of {OBJECTION_LIMIT_CHOICES:?}", settings.objection_limit),
            ));
        }
        record.objective = Some(objective);
        record.settings = Some(settings);
        self.store.save(&record).await?;
        info!(?objective, minutes = settings.time_limit_minutes, "case configured");
        Ok(record)
    }

    /// Stores the prepared strategy.
    ///
    /// Blank arguments and unnamed evidence are dropped, duplicate argument ids
    /// keep their first occurrence, and evidence links to unknown arguments are removed.
    pub async fn build_strategy(&mut self, strategy: Strategy) -> Result<SessionRecord> {
        const ACTION: &str = "build strategy";
        let mut record = self.editable(ACTION).await?;
        if record.settings.is_none() {
            return Err(refuse(ACTION, "the case file has not been configured"));
        }
        let strategy = normalize_strategy(strategy);
        info!(
            arguments = strategy.arguments.len(),
            evidences = strategy.evidences.len(),
            "strategy built"
        );
        record.strategy = Some(strategy);
        self.store.save(&record).await?;
        Ok(record)
    }

    /// Builds a coaching request for a strategy draft.
    pub async fn advice_request(&self, draft: &Strategy) -> Result<AdviceRequest> {
        let record = self.current().await?;
        let coach = record
            .coach
            .ok_or_else(|| refuse("ask the coach", "no coach has been configured"))?;
        Ok(AdviceRequest {
            content: serde_json::to_string(draft)?,
            coach_type: coach.coach_type,
            tone: coach.tone,
        })
    }

    /// Asks the coach about a strategy draft and waits for the answer.
    pub async fn request_coach_advice(&self, draft: &Strategy) -> Result<CoachAdvice> {
        let request = self.advice_request(draft).await?;
        request.send(self.advisor.as_ref()).await
    }

    // -----------------------------------------------------------------------
    // Live round
    // -----------------------------------------------------------------------

    /// Opens the live round: sets the time budget, seeds the transcript and starts
    /// the clock. `on_expire` runs once if the clock reaches zero.
    pub async fn start_round(
        &mut self,
        on_expire: impl FnOnce() + Send + 'static,
    ) -> Result<&LiveRound> {
        const ACTION: &str = "start the round";
        let mut record = self.current().await?;
        if record.stage() != Stage::StrategyBuilt {
            return Err(refuse(
                ACTION,
                format!("session is at {:?}, expected StrategyBuilt", record.stage()),
            ));
        }
        let settings = record
            .settings
            .ok_or_else(|| refuse(ACTION, "the case file has not been configured"))?;
        let scenario = catalog::scenario(record.scenario_id).ok_or_else(|| {
            refuse(ACTION, format!("unknown scenario {}", record.scenario_id))
        })?;

        let duration = settings.time_limit_minutes * 60;
        record.time_remaining_seconds = Some(duration);
        record.rounds_completed = Some(0);
        record.transcript = vec![Exchange {
            role: ExchangeRole::System,
            text: opening_statement(scenario, record.role),
            round: 1,
        }];
        self.store.save(&record).await?;

        let mut clock = DebateClock::new(settings.pause_enabled);
        clock.start(duration, on_expire);
        self.rounds_started += 1;
        info!(scenario = scenario.id, duration, "round started");

        Ok(self.live.insert(LiveRound {
            record,
            scenario,
            generation: self.rounds_started,
            clock,
            current_round: 1,
            objections_used: 0,
            awaiting_opponent: false,
        }))
    }

    /// Records the user's argument and opens an opponent request for it.
    ///
    /// Only one request may be outstanding at a time. Nothing changes unless the
    /// updated record was saved.
    pub async fn submit_argument(&mut self, text: &str) -> Result<PendingExchange> {
        const ACTION: &str = "submit an argument";
        let text = text.trim();
        let (record, pending) = {
            let live = self.live_mut(ACTION)?;
            if text.is_empty() {
                return Err(refuse(ACTION, "the argument is empty"));
            }
            if live.awaiting_opponent {
                return Err(refuse(ACTION, "the opponent is still responding"));
            }
            if live.rounds_completed() >= TOTAL_ROUNDS {
                return Err(refuse(ACTION, "all rounds have been argued"));
            }
            let pending = PendingExchange {
                round: live.current_round,
                argument: text.to_owned(),
                scenario: live.scenario,
                generation: live.generation,
                transcript_index: live.record.transcript.len(),
            };
            (live.staged_with(ExchangeRole::User, text), pending)
        };

        let live = self.save_live(record).await?;
        live.awaiting_opponent = true;
        Ok(pending)
    }

    /// Applies the result of an opponent request.
    ///
    /// A reply that arrives after the round concluded, or for a ticket that is
    /// no longer current, is discarded. A failed request, or a reply that cannot
    /// be saved, withdraws the user's argument for that round and reopens input.
    pub async fn accept_opponent(
        &mut self,
        pending: &PendingExchange,
        reply: Result<OpponentReply>,
    ) -> Result<ExchangeOutcome> {
        let Some(live) = self.live.as_ref() else {
            return Ok(ExchangeOutcome::Discarded);
        };
        if live.is_concluded()
            || !live.awaiting_opponent
            || pending.generation != live.generation
            || pending.round != live.current_round
        {
            debug!(round = pending.round, "stale opponent reply discarded");
            return Ok(ExchangeOutcome::Discarded);
        }

        let err = match reply {
            Ok(reply) => {
                let mut record = live.staged_with(ExchangeRole::Opponent, reply.text);
                let completed = live.rounds_completed() + 1;
                record.rounds_completed = Some(completed);
                let exhausted = completed >= TOTAL_ROUNDS;
                if exhausted {
                    push_exchange(
                        &mut record,
                        ExchangeRole::System,
                        format!("All {TOTAL_ROUNDS} rounds are complete. Deliver your closing conclusion."),
                        live.current_round,
                    );
                }
                match self.save_live(record).await {
                    Ok(live) => {
                        live.awaiting_opponent = false;
                        if exhausted {
                            return Ok(ExchangeOutcome::RoundsExhausted);
                        }
                        live.current_round += 1;
                        return Ok(ExchangeOutcome::NextRound(live.current_round));
                    }
                    Err(e) => e,
                }
            }
            Err(e) => e,
        };

        warn!(round = pending.round, error = %err, "opponent exchange failed");
        self.withdraw_argument(pending).await;
        Err(err)
    }

    /// Submits an argument and waits for the opponent in one call.
    pub async fn exchange(&mut self, text: &str) -> Result<ExchangeOutcome> {
        let pending = self.submit_argument(text).await?;
        let reply = pending.send(self.opponent.as_ref()).await;
        self.accept_opponent(&pending, reply).await
    }

    /// Records an objection, bounded by the configured objection limit.
    ///
    /// Returns the number of objections left.
    pub async fn raise_objection(&mut self) -> Result<u32> {
        let record = {
            let live = self.live_mut("raise an objection")?;
            let limit = live.objection_limit();
            if live.objections_used >= limit {
                warn!(limit, "objection refused");
                return Err(CourtroomError::ActionLimitExceeded {
                    action: "objection",
                    limit,
                });
            }
            live.staged_with(
                ExchangeRole::Objection,
                "OBJECTION! That argument has no legal basis.",
            )
        };
        let live = self.save_live(record).await?;
        live.objections_used += 1;
        Ok(live.objections_left())
    }

    pub fn pause(&mut self) -> Result<()> {
        let live = self.live_mut("pause")?;
        live.clock.pause().inspect_err(|e| warn!(error = %e, "pause refused"))
    }

    /// Advances the debate clock by one second.
    ///
    /// On expiry a closing system message is appended; the host is expected to
    /// follow up with `conclude(ConclusionReason::TimeExpired)`.
    pub async fn tick(&mut self) -> Result<ClockEvent> {
        let Some(live) = self.live.as_mut() else {
            return Ok(ClockEvent::Inert);
        };
        let event = live.clock.tick();
        if event == ClockEvent::Expired {
            info!("debate time expired");
            let record = live.staged_with(ExchangeRole::System, "Time is up! The hearing is over.");
            self.save_live(record).await?;
        }
        Ok(event)
    }

    /// Finalizes the live round and scores it.
    ///
    /// All reasons converge here: remaining time and rounds are frozen and
    /// `completed` is set. Once that record is saved the clock is stopped, the
    /// scoring engine runs and its verdict is stored with the record.
    pub async fn conclude(&mut self, reason: ConclusionReason) -> Result<Verdict> {
        const ACTION: &str = "conclude the round";
        let record = {
            let live = self.live_mut(ACTION)?;
            match reason {
                ConclusionReason::TimeExpired if !live.clock.has_expired() => {
                    return Err(refuse(ACTION, "the clock has not expired"));
                }
                ConclusionReason::AllRoundsCompleted if live.rounds_completed() < TOTAL_ROUNDS => {
                    return Err(refuse(
                        ACTION,
                        format!("only {} of {TOTAL_ROUNDS} rounds argued", live.rounds_completed()),
                    ));
                }
                _ => {}
            }
            let mut record = live.record.clone();
            record.completed = true;
            record.time_remaining_seconds = Some(live.clock.remaining());
            record.rounds_completed = Some(live.rounds_completed());
            record
        };

        let live = self.save_live(record).await?;
        live.clock.stop();
        live.awaiting_opponent = false;
        info!(
            ?reason,
            time_remaining = live.clock.remaining(),
            rounds = live.rounds_completed(),
            "round concluded"
        );

        self.finalize_live().await
    }

    // -----------------------------------------------------------------------
    // Results
    // -----------------------------------------------------------------------

    /// The verdict of the concluded session.
    ///
    /// Scoring runs once; later calls return the stored verdict without awarding
    /// badges again.
    pub async fn results(&mut self) -> Result<Verdict> {
        let mut record = self.current().await?;
        if !record.completed {
            return Err(refuse("show results", "the round has not concluded"));
        }
        if let Some(verdict) = record.verdict.clone() {
            return Ok(verdict);
        }
        // A verdict whose save failed during conclude is still held by the live round.
        let scored = self
            .live
            .as_ref()
            .filter(|live| live.record.completed)
            .and_then(|live| live.record.verdict.clone());
        let verdict = match scored {
            Some(verdict) => verdict,
            None => self.scoring.finalize(&record).await?,
        };
        record.verdict = Some(verdict.clone());
        self.store.save(&record).await?;
        Ok(verdict)
    }

    /// Leaves the results screen, ending the session.
    pub async fn leave_results(&mut self) -> Result<()> {
        self.live = None;
        self.store.clear().await?;
        info!("session closed");
        Ok(())
    }

    pub async fn badge_collection(&self) -> Result<(Vec<BadgeRecord>, BadgeSummary)> {
        self.scoring.collection().await
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Loads the record for a preparation stage, refusing once a round has started.
    async fn editable(&self, action: &'static str) -> Result<SessionRecord> {
        let record = self.current().await?;
        if record.stage() >= Stage::RoundActive {
            return Err(refuse(action, "the live round has already started"));
        }
        Ok(record)
    }

    fn live_mut(&mut self, action: &'static str) -> Result<&mut LiveRound> {
        match self.live.as_mut() {
            Some(live) if live.is_concluded() => Err(refuse(action, "the round has concluded")),
            Some(live) => Ok(live),
            None => Err(refuse(action, "no live round is in progress")),
        }
    }

    /// Saves `record` and, only once that succeeded, makes it the live record.
    async fn save_live(&mut self, record: SessionRecord) -> Result<&mut LiveRound> {
        self.store.save(&record).await?;
        let live = self.live.as_mut().ok_or(CourtroomError::SessionNotFound)?;
        live.record = record;
        Ok(live)
    }

    /// Drops the user exchange `pending` appended and reopens input.
    async fn withdraw_argument(&mut self, pending: &PendingExchange) {
        let Some(live) = self.live.as_mut() else {
            return;
        };
        live.awaiting_opponent = false;
        let index = pending.transcript_index;
        let is_ticket_entry = live.record.transcript.get(index).is_some_and(|e| {
            e.role == ExchangeRole::User && e.round == pending.round && e.text == pending.argument
        });
        if !is_ticket_entry {
            return;
        }
        live.record.transcript.remove(index);
        // The in-memory record is authoritative; a later save overwrites a stale row.
        if let Err(e) = self.store.save(&live.record).await {
            warn!(error = %e, "failed to save withdrawn argument");
        }
    }

    async fn finalize_live(&mut self) -> Result<Verdict> {
        let Some(live) = self.live.as_mut() else {
            return Err(CourtroomError::SessionNotFound);
        };
        let verdict = self.scoring.finalize(&live.record).await?;
        // Set before saving; results() reuses it if the save fails.
        live.record.verdict = Some(verdict.clone());
        self.store.save(&live.record).await?;
        Ok(verdict)
    }
}

fn refuse(action: &'static str, reason: impl Into<String>) -> CourtroomError {
    let err = CourtroomError::precondition(action, reason);
    warn!(error = %err, "transition refused");
    err
}

fn opening_statement(scenario: &Scenario, role: Option<Role>) -> String {
    let role = role.map_or("counsel", Role::counsel_title);
    format!(
        "Court is in session.\n\nCase: {}\nYour role: {role}\n\nPresent your opening argument.",
        scenario.name
    )
}

fn normalize_strategy(strategy: Strategy) -> Strategy {
    let mut seen = HashSet::new();
    let arguments: Vec<_> = strategy
        .arguments
        .into_iter()
        .filter(|a| !a.text.trim().is_empty())
        .filter(|a| seen.insert(a.id))
        .collect();

    let evidences = strategy
        .evidences
        .into_iter()
        .filter(|e| !e.name.trim().is_empty())
        .map(|mut e| {
            let mut linked = HashSet::new();
            e.linked_argument_ids
                .retain(|id| seen.contains(id) && linked.insert(*id));
            e
        })
        .collect();

    Strategy {
        arguments,
        evidences,
        requirements: strategy.requirements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Argument, Evidence};

    #[test]
    fn normalize_drops_blank_and_dangling_entries() {
        let strategy = Strategy {
            arguments: vec![
                Argument { id: 1, text: "deposit must be returned".into() },
                Argument { id: 2, text: "   ".into() },
                Argument { id: 1, text: "duplicate id".into() },
                Argument { id: 3, text: "moving costs".into() },
            ],
            evidences: vec![
                Evidence { id: 10, name: "lease".into(), linked_argument_ids: vec![1, 2, 3, 3] },
                Evidence { id: 11, name: "".into(), linked_argument_ids: vec![] },
            ],
            requirements: "full refund".into(),
        };

        let normalized = normalize_strategy(strategy);
        let ids: Vec<_> = normalized.arguments.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(normalized.arguments[0].text, "deposit must be returned");
        assert_eq!(normalized.evidences.len(), 1);
        assert_eq!(normalized.evidences[0].linked_argument_ids, vec![1, 3]);
        assert_eq!(normalized.requirements, "full refund");
    }

    #[test]
    fn opening_names_case_and_role() {
        let scenario = catalog::scenario(2).unwrap();
        let text = opening_statement(scenario, Some(Role::Defendant));
        assert!(text.contains(scenario.name));
        assert!(text.contains("defence counsel"));
    }
}
