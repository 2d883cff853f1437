//! Flow-level tests for the session state machine against in-memory stores.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use courtroom_core::clock::{ClockEvent, PAUSE_BUDGET, PAUSE_SECONDS};
use courtroom_core::error::{CourtroomError, PauseRefusal};
use courtroom_core::flow::{ConclusionReason, ExchangeOutcome, SessionFlowController};
use courtroom_core::responder::{MockCoach, MockOpponent, OpponentReply, OpponentResponder};
use courtroom_core::scoring::Dice;
use courtroom_core::store::{BadgeLedger, MemoryBadgeLedger, MemorySessionStore, SessionStore};
use courtroom_core::types::{
    Argument, CoachConfig, CoachType, Evidence, ExchangeRole, Objective, Role, Scenario,
    SessionRecord, SessionSettings, Stage, Strategy, TOTAL_ROUNDS,
};

/// Rolls the top of every range.
struct Maxed;

impl Dice for Maxed {
    fn roll(&mut self, _low: u32, high: u32) -> u32 {
        high - 1
    }
}

struct DownOpponent;

#[async_trait]
impl OpponentResponder for DownOpponent {
    async fn respond(
        &self,
        _round: u32,
        _argument: &str,
        _scenario: &Scenario,
    ) -> courtroom_core::Result<OpponentReply> {
        Err(CourtroomError::Network("connection refused".into()))
    }
}

/// Fails the first `failures` requests, then answers like the mock.
struct FlakyOpponent {
    failures: AtomicUsize,
    inner: MockOpponent,
}

#[async_trait]
impl OpponentResponder for FlakyOpponent {
    async fn respond(
        &self,
        round: u32,
        argument: &str,
        scenario: &Scenario,
    ) -> courtroom_core::Result<OpponentReply> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(CourtroomError::Network("connection reset".into()));
        }
        self.inner.respond(round, argument, scenario).await
    }
}

/// An in-memory store that fails every save once its allowance runs out.
struct FailingStore {
    saves_left: AtomicUsize,
    inner: MemorySessionStore,
}

impl FailingStore {
    fn new() -> Self {
        Self {
            saves_left: AtomicUsize::new(usize::MAX),
            inner: MemorySessionStore::new(),
        }
    }

    fn fail_after(&self, saves: usize) {
        self.saves_left.store(saves, Ordering::SeqCst);
    }

    fn recover(&self) {
        self.saves_left.store(usize::MAX, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for FailingStore {
    async fn save(&self, record: &SessionRecord) -> courtroom_core::Result<()> {
        let allowed = self
            .saves_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !allowed {
            return Err(CourtroomError::Network("disk unavailable".into()));
        }
        self.inner.save(record).await
    }

    async fn load(&self) -> courtroom_core::Result<Option<SessionRecord>> {
        self.inner.load().await
    }

    async fn clear(&self) -> courtroom_core::Result<()> {
        self.inner.clear().await
    }
}

fn flow_over(store: Arc<FailingStore>) -> SessionFlowController {
    let ledger = Arc::new(MemoryBadgeLedger::new());
    SessionFlowController::new(
        store,
        courtroom_core::scoring::ScoringEngine::new(ledger, Maxed),
        Arc::new(MockOpponent::new(Duration::ZERO)),
        Arc::new(MockCoach::seeded(Duration::ZERO, 1)),
    )
}

struct Harness {
    flow: SessionFlowController,
    store: Arc<MemorySessionStore>,
    ledger: Arc<MemoryBadgeLedger>,
}

fn harness_with(opponent: Arc<dyn OpponentResponder>) -> Harness {
    let store = Arc::new(MemorySessionStore::new());
    let ledger = Arc::new(MemoryBadgeLedger::new());
    let scoring = courtroom_core::scoring::ScoringEngine::new(ledger.clone(), Maxed);
    let flow = SessionFlowController::new(
        store.clone(),
        scoring,
        opponent,
        Arc::new(MockCoach::seeded(Duration::ZERO, 1)),
    );
    Harness { flow, store, ledger }
}

fn harness() -> Harness {
    harness_with(Arc::new(MockOpponent::new(Duration::ZERO)))
}

fn strategy() -> Strategy {
    Strategy {
        arguments: vec![
            Argument { id: 1, text: "The landlord kept the deposit without cause".into() },
            Argument { id: 2, text: "Renovations were agreed in writing".into() },
            Argument { id: 3, text: "Moving costs follow from the breach".into() },
        ],
        evidences: vec![
            Evidence { id: 1, name: "Signed lease".into(), linked_argument_ids: vec![1, 2] },
            Evidence { id: 2, name: "Bank transfer".into(), linked_argument_ids: vec![1] },
        ],
        requirements: "Return the deposit".into(),
    }
}

async fn prepare(flow: &mut SessionFlowController, settings: SessionSettings) {
    flow.select_scenario(1).await.unwrap();
    flow.choose_role(Role::Plaintiff).await.unwrap();
    flow.configure_coach(CoachConfig::default()).await.unwrap();
    flow.configure_case(Objective::Compensation, settings).await.unwrap();
    flow.build_strategy(strategy()).await.unwrap();
}

#[tokio::test]
async fn each_stage_keeps_earlier_fields() {
    let Harness { mut flow, store, .. } = harness();

    flow.select_scenario(2).await.unwrap();
    let after_role = flow.choose_role(Role::Defendant).await.unwrap();
    assert_eq!(after_role.stage(), Stage::RoleChosen);

    let coach = CoachConfig { coach_type: CoachType::Normal, tone: 80, ..CoachConfig::default() };
    flow.configure_coach(coach).await.unwrap();
    let settings = SessionSettings { time_limit_minutes: 15, objection_limit: 5, pause_enabled: false };
    flow.configure_case(Objective::Mediation, settings).await.unwrap();
    flow.build_strategy(strategy()).await.unwrap();

    let record = store.load().await.unwrap().unwrap();
    assert_eq!(record.scenario_id, 2);
    assert_eq!(record.role, Some(Role::Defendant));
    assert_eq!(record.coach, Some(coach));
    assert_eq!(record.objective, Some(Objective::Mediation));
    assert_eq!(record.settings, Some(settings));
    assert_eq!(record.argument_count(), 3);
    assert_eq!(record.stage(), Stage::StrategyBuilt);

    // Reconfiguring a stage overwrites only its own field
    flow.choose_role(Role::Plaintiff).await.unwrap();
    let record = store.load().await.unwrap().unwrap();
    assert_eq!(record.role, Some(Role::Plaintiff));
    assert_eq!(record.coach, Some(coach));
    assert_eq!(record.settings, Some(settings));

    // A new scenario replaces the record wholesale
    let fresh = flow.select_scenario(3).await.unwrap();
    assert_eq!(fresh.stage(), Stage::ScenarioChosen);
    assert!(store.load().await.unwrap().unwrap().role.is_none());
}

#[tokio::test]
async fn missing_session_is_reported_not_recovered() {
    let Harness { mut flow, .. } = harness();

    assert!(matches!(flow.results().await, Err(CourtroomError::SessionNotFound)));
    assert!(matches!(
        flow.choose_role(Role::Plaintiff).await,
        Err(CourtroomError::SessionNotFound)
    ));
    assert!(matches!(
        flow.start_round(|| {}).await,
        Err(CourtroomError::SessionNotFound)
    ));
    assert!(flow.results().await.unwrap_err().requires_restart());
}

#[tokio::test]
async fn preconditions_are_enforced_in_order() {
    let Harness { mut flow, .. } = harness();
    flow.select_scenario(1).await.unwrap();

    assert!(matches!(
        flow.configure_coach(CoachConfig::default()).await,
        Err(CourtroomError::PreconditionFailed { .. })
    ));
    assert!(matches!(
        flow.select_scenario(99).await,
        Err(CourtroomError::PreconditionFailed { .. })
    ));

    flow.choose_role(Role::Plaintiff).await.unwrap();
    let loud = CoachConfig { tone: 101, ..CoachConfig::default() };
    assert!(flow.configure_coach(loud).await.is_err());
    flow.configure_coach(CoachConfig::default()).await.unwrap();

    let odd = SessionSettings { time_limit_minutes: 7, ..SessionSettings::default() };
    assert!(flow.configure_case(Objective::Compensation, odd).await.is_err());
    assert!(flow.start_round(|| {}).await.is_err(), "no strategy yet");
}

#[tokio::test]
async fn full_round_concludes_and_scores_once() {
    let Harness { mut flow, store, ledger } = harness();
    prepare(&mut flow, SessionSettings::default()).await;

    let live = flow.start_round(|| {}).await.unwrap();
    assert_eq!(live.clock().remaining(), 600);
    assert_eq!(live.transcript().len(), 1);
    assert_eq!(live.transcript()[0].role, ExchangeRole::System);

    for round in 1..=TOTAL_ROUNDS {
        let outcome = flow.exchange(&format!("argument {round}")).await.unwrap();
        if round < TOTAL_ROUNDS {
            assert_eq!(outcome, ExchangeOutcome::NextRound(round + 1));
        } else {
            assert_eq!(outcome, ExchangeOutcome::RoundsExhausted);
        }
    }

    let live = flow.live().unwrap();
    assert!(live.can_conclude());
    assert!(!live.accepts_arguments());
    // opening + 4 * (user, opponent) + closing prompt
    assert_eq!(live.transcript().len(), 10);
    assert!(flow.submit_argument("one more").await.is_err());

    flow.tick().await.unwrap();
    let verdict = flow.conclude(ConclusionReason::AllRoundsCompleted).await.unwrap();
    assert_eq!(verdict.scores.time_management, 100);
    assert_eq!(verdict.scores.evidence_use, 100);
    assert!(verdict.earned_badges.contains(&"excellent".to_string()));

    let record = store.load().await.unwrap().unwrap();
    assert!(record.completed);
    assert_eq!(record.stage(), Stage::RoundConcluded);
    assert_eq!(record.rounds_completed, Some(TOTAL_ROUNDS));
    assert_eq!(record.time_remaining_seconds, Some(599));

    // Re-entering results returns the stored verdict without awarding again
    let earned_before: u32 = ledger.get_all().await.unwrap().iter().map(|b| b.count).sum();
    assert_eq!(flow.results().await.unwrap(), verdict);
    assert_eq!(flow.results().await.unwrap(), verdict);
    let earned_after: u32 = ledger.get_all().await.unwrap().iter().map(|b| b.count).sum();
    assert_eq!(earned_before, earned_after);

    // Configuration is closed after the round started
    assert!(flow.choose_role(Role::Defendant).await.is_err());

    flow.leave_results().await.unwrap();
    assert!(store.load().await.unwrap().is_none());
    assert!(matches!(flow.results().await, Err(CourtroomError::SessionNotFound)));
}

#[tokio::test]
async fn concluding_early_needs_no_rounds() {
    let Harness { mut flow, .. } = harness();
    prepare(&mut flow, SessionSettings::default()).await;
    flow.start_round(|| {}).await.unwrap();

    assert!(matches!(
        flow.conclude(ConclusionReason::AllRoundsCompleted).await,
        Err(CourtroomError::PreconditionFailed { .. })
    ));
    assert!(matches!(
        flow.conclude(ConclusionReason::TimeExpired).await,
        Err(CourtroomError::PreconditionFailed { .. })
    ));

    let verdict = flow.conclude(ConclusionReason::EndedEarly).await.unwrap();
    assert_eq!(verdict.scores.time_management, 100);
    assert!(flow.conclude(ConclusionReason::EndedEarly).await.is_err());
}

#[tokio::test]
async fn only_one_opponent_request_at_a_time() {
    let Harness { mut flow, .. } = harness();
    prepare(&mut flow, SessionSettings::default()).await;
    flow.start_round(|| {}).await.unwrap();

    let pending = flow.submit_argument("The deposit is owed").await.unwrap();
    assert_eq!(pending.round, 1);
    assert!(flow.live().unwrap().awaiting_opponent());
    assert!(flow.submit_argument("And another thing").await.is_err());
    assert!(flow.submit_argument("   ").await.is_err());

    let reply = pending.send(flow.opponent().as_ref()).await;
    let outcome = flow.accept_opponent(&pending, reply).await.unwrap();
    assert_eq!(outcome, ExchangeOutcome::NextRound(2));

    let roles: Vec<_> = flow.live().unwrap().transcript().iter().map(|e| e.role).collect();
    assert_eq!(roles, vec![ExchangeRole::System, ExchangeRole::User, ExchangeRole::Opponent]);
}

#[tokio::test]
async fn reply_after_conclusion_is_discarded() {
    let Harness { mut flow, store, .. } = harness();
    prepare(&mut flow, SessionSettings::default()).await;
    flow.start_round(|| {}).await.unwrap();

    let pending = flow.submit_argument("Last words").await.unwrap();
    flow.conclude(ConclusionReason::EndedEarly).await.unwrap();
    let before = store.load().await.unwrap().unwrap().transcript;

    let reply = pending.send(flow.opponent().as_ref()).await;
    let outcome = flow.accept_opponent(&pending, reply).await.unwrap();
    assert_eq!(outcome, ExchangeOutcome::Discarded);
    assert_eq!(store.load().await.unwrap().unwrap().transcript, before);
}

#[tokio::test]
async fn failed_reply_leaves_round_awaiting_input() {
    let Harness { mut flow, .. } = harness_with(Arc::new(DownOpponent));
    prepare(&mut flow, SessionSettings::default()).await;
    flow.start_round(|| {}).await.unwrap();

    let err = flow.exchange("The deposit is owed").await.unwrap_err();
    assert!(matches!(err, CourtroomError::Network(_)));

    let live = flow.live().unwrap();
    assert!(!live.awaiting_opponent());
    assert_eq!(live.current_round(), 1);
    assert_eq!(live.rounds_completed(), 0);
    assert!(live.transcript().iter().all(|e| e.role != ExchangeRole::Opponent));
    assert!(live.transcript().iter().all(|e| e.role != ExchangeRole::User));
    assert!(live.accepts_arguments());
}

#[tokio::test]
async fn retried_argument_is_recorded_once() {
    let opponent = FlakyOpponent {
        failures: AtomicUsize::new(2),
        inner: MockOpponent::new(Duration::ZERO),
    };
    let Harness { mut flow, store, .. } = harness_with(Arc::new(opponent));
    prepare(&mut flow, SessionSettings::default()).await;
    flow.start_round(|| {}).await.unwrap();

    assert!(flow.exchange("The deposit is owed").await.is_err());
    assert!(flow.exchange("The deposit is owed").await.is_err());
    let stored = store.load().await.unwrap().unwrap();
    assert!(stored.transcript.iter().all(|e| e.role == ExchangeRole::System));

    let outcome = flow.exchange("The deposit is owed").await.unwrap();
    assert_eq!(outcome, ExchangeOutcome::NextRound(2));

    let roles: Vec<_> = flow.live().unwrap().transcript().iter().map(|e| e.role).collect();
    assert_eq!(roles, vec![ExchangeRole::System, ExchangeRole::User, ExchangeRole::Opponent]);
    assert_eq!(store.load().await.unwrap().unwrap().transcript.len(), 3);
}

#[tokio::test]
async fn failed_save_changes_nothing() {
    let store = Arc::new(FailingStore::new());
    let mut flow = flow_over(store.clone());
    prepare(&mut flow, SessionSettings::default()).await;
    flow.start_round(|| {}).await.unwrap();
    let transcript = flow.live().unwrap().transcript().to_vec();

    store.fail_after(0);
    let err = flow.submit_argument("The deposit is owed").await.unwrap_err();
    assert!(matches!(err, CourtroomError::Network(_)));
    assert!(flow.raise_objection().await.is_err());
    assert!(flow.conclude(ConclusionReason::EndedEarly).await.is_err());

    let live = flow.live().unwrap();
    assert!(!live.awaiting_opponent());
    assert!(live.accepts_arguments());
    assert!(!live.is_concluded());
    assert_eq!(live.objections_left(), SessionSettings::default().objection_limit);
    assert_eq!(live.transcript(), transcript.as_slice());

    store.recover();
    let pending = flow.submit_argument("The deposit is owed").await.unwrap();
    assert_eq!(pending.round, 1);
}

#[tokio::test]
async fn unsaved_reply_withdraws_the_argument() {
    let store = Arc::new(FailingStore::new());
    let mut flow = flow_over(store.clone());
    prepare(&mut flow, SessionSettings::default()).await;
    flow.start_round(|| {}).await.unwrap();

    let pending = flow.submit_argument("The deposit is owed").await.unwrap();
    let reply = pending.send(flow.opponent().as_ref()).await;
    store.fail_after(0);
    assert!(flow.accept_opponent(&pending, reply).await.is_err());

    let live = flow.live().unwrap();
    assert!(live.accepts_arguments());
    assert_eq!(live.rounds_completed(), 0);
    assert_eq!(live.current_round(), 1);
    let roles: Vec<_> = live.transcript().iter().map(|e| e.role).collect();
    assert_eq!(roles, vec![ExchangeRole::System]);
}

#[tokio::test]
async fn verdict_survives_a_failed_save() {
    let store = Arc::new(FailingStore::new());
    let ledger = Arc::new(MemoryBadgeLedger::new());
    let mut flow = SessionFlowController::new(
        store.clone(),
        courtroom_core::scoring::ScoringEngine::new(ledger.clone(), Maxed),
        Arc::new(MockOpponent::new(Duration::ZERO)),
        Arc::new(MockCoach::seeded(Duration::ZERO, 1)),
    );
    prepare(&mut flow, SessionSettings::default()).await;
    flow.start_round(|| {}).await.unwrap();

    // The completed record is saved; saving the verdict fails.
    store.fail_after(1);
    assert!(flow.conclude(ConclusionReason::EndedEarly).await.is_err());
    assert!(flow.live().unwrap().is_concluded());
    assert_eq!(flow.current().await.unwrap().verdict, None);
    let awarded = ledger.get_all().await.unwrap();
    assert!(!awarded.is_empty());

    store.recover();
    let verdict = flow.results().await.unwrap();
    assert_eq!(Some(verdict), flow.current().await.unwrap().verdict);
    assert_eq!(ledger.get_all().await.unwrap(), awarded);
}

#[tokio::test]
async fn reply_from_an_earlier_session_is_discarded() {
    let Harness { mut flow, store, .. } = harness();
    prepare(&mut flow, SessionSettings::default()).await;
    flow.start_round(|| {}).await.unwrap();
    let stale = flow.submit_argument("First session argument").await.unwrap();
    flow.conclude(ConclusionReason::EndedEarly).await.unwrap();
    flow.leave_results().await.unwrap();

    prepare(&mut flow, SessionSettings::default()).await;
    flow.start_round(|| {}).await.unwrap();
    let pending = flow.submit_argument("Second session argument").await.unwrap();
    assert_eq!(pending.round, stale.round);

    let reply = stale.send(flow.opponent().as_ref()).await;
    let outcome = flow.accept_opponent(&stale, reply).await.unwrap();
    assert_eq!(outcome, ExchangeOutcome::Discarded);
    let live = flow.live().unwrap();
    assert!(live.awaiting_opponent());
    assert_eq!(live.rounds_completed(), 0);
    assert_eq!(store.load().await.unwrap().unwrap().transcript.len(), 2);

    let reply = pending.send(flow.opponent().as_ref()).await;
    let outcome = flow.accept_opponent(&pending, reply).await.unwrap();
    assert_eq!(outcome, ExchangeOutcome::NextRound(2));
}

#[tokio::test]
async fn objections_are_bounded() {
    let Harness { mut flow, .. } = harness();
    let settings = SessionSettings { objection_limit: 2, ..SessionSettings::default() };
    prepare(&mut flow, settings).await;
    flow.start_round(|| {}).await.unwrap();

    assert_eq!(flow.raise_objection().await.unwrap(), 1);
    assert_eq!(flow.raise_objection().await.unwrap(), 0);
    assert!(matches!(
        flow.raise_objection().await,
        Err(CourtroomError::ActionLimitExceeded { limit: 2, .. })
    ));

    let objections = flow
        .live()
        .unwrap()
        .transcript()
        .iter()
        .filter(|e| e.role == ExchangeRole::Objection)
        .count();
    assert_eq!(objections, 2);
}

#[tokio::test]
async fn clock_expiry_fires_once_and_concludes() {
    let Harness { mut flow, .. } = harness();
    let settings = SessionSettings { time_limit_minutes: 5, ..SessionSettings::default() };
    prepare(&mut flow, settings).await;

    let fired = Arc::new(AtomicUsize::new(0));
    let hook = Arc::clone(&fired);
    flow.start_round(move || {
        hook.fetch_add(1, Ordering::SeqCst);
    })
    .await
    .unwrap();

    for _ in 0..299 {
        assert!(matches!(flow.tick().await.unwrap(), ClockEvent::Counted { .. }));
    }
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(flow.tick().await.unwrap(), ClockEvent::Expired);
    assert_eq!(flow.tick().await.unwrap(), ClockEvent::Inert);
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    let last = flow.live().unwrap().transcript().last().unwrap().clone();
    assert_eq!(last.role, ExchangeRole::System);

    let verdict = flow.conclude(ConclusionReason::TimeExpired).await.unwrap();
    assert_eq!(verdict.scores.time_management, 50);
}

#[tokio::test]
async fn pause_rules_follow_settings() {
    let Harness { mut flow, .. } = harness();
    let no_pause = SessionSettings { pause_enabled: false, ..SessionSettings::default() };
    prepare(&mut flow, no_pause).await;
    flow.start_round(|| {}).await.unwrap();
    assert!(matches!(
        flow.pause(),
        Err(CourtroomError::PauseNotAllowed(PauseRefusal::Disabled))
    ));

    prepare(&mut flow, SessionSettings::default()).await;
    flow.start_round(|| {}).await.unwrap();
    for _ in 0..PAUSE_BUDGET {
        flow.pause().unwrap();
        for _ in 0..PAUSE_SECONDS {
            flow.tick().await.unwrap();
        }
    }
    assert_eq!(flow.live().unwrap().clock().remaining(), 600);
    assert!(matches!(
        flow.pause(),
        Err(CourtroomError::PauseNotAllowed(PauseRefusal::BudgetExhausted))
    ));
}

#[tokio::test]
async fn coach_advice_needs_a_coach() {
    let Harness { mut flow, .. } = harness();
    flow.select_scenario(1).await.unwrap();
    assert!(flow.request_coach_advice(&strategy()).await.is_err());

    flow.choose_role(Role::Plaintiff).await.unwrap();
    flow.configure_coach(CoachConfig::default()).await.unwrap();
    let advice = flow.request_coach_advice(&strategy()).await.unwrap();
    assert!(!advice.text.is_empty());
}
