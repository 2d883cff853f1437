//! Commands produced by the key dispatcher and run against the flow controller.
//!
//! The dispatcher stays synchronous and pure; anything that touches the session
//! (and therefore the store) is expressed as a [`Command`] and executed here by
//! the event loop. Opponent and coach calls are spawned so their latency never
//! blocks input; their results come back as `AppEvent`s.

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use courtroom_core::flow::{ConclusionReason, ExchangeOutcome, PendingExchange, SessionFlowController};
use courtroom_core::responder::{CoachAdvice, OpponentReply};
use courtroom_core::types::{CoachConfig, Objective, Role, SessionSettings, Strategy};
use courtroom_core::Result;

use crate::app::{AppState, Mode, Screen};
use crate::event::AppEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SelectScenario(u32),
    ChooseRole(Role),
    ConfigureCoach(CoachConfig),
    ConfigureCase {
        objective: Objective,
        settings: SessionSettings,
    },
    AskCoach(Strategy),
    /// Commit the strategy and open the hearing.
    BeginHearing(Strategy),
    SubmitArgument(String),
    RaiseObjection,
    Pause,
    Conclude(ConclusionReason),
    /// Open the results screen for the concluded round.
    ShowResults,
    /// Leave the results screen; optionally continue to the badge collection.
    LeaveResults { show_badges: bool },
    OpenBadges,
}

/// Runs `command`, reporting any failure in the status line.
pub async fn execute(
    command: Command,
    flow: &mut SessionFlowController,
    state: &mut AppState,
    tx: &UnboundedSender<AppEvent>,
) {
    debug!(?command, "executing command");
    if let Err(e) = run(command, flow, state, tx).await {
        state.report(&e);
    }
}

async fn run(
    command: Command,
    flow: &mut SessionFlowController,
    state: &mut AppState,
    tx: &UnboundedSender<AppEvent>,
) -> Result<()> {
    match command {
        Command::SelectScenario(id) => {
            flow.select_scenario(id).await?;
            state.reset_forms();
            state.scenario_id = Some(id);
            state.screen = Screen::ScenarioDetail;
            state.status = None;
        }
        Command::ChooseRole(role) => {
            flow.choose_role(role).await?;
            state.screen = Screen::Coach;
        }
        Command::ConfigureCoach(coach) => {
            flow.configure_coach(coach).await?;
            state.screen = Screen::CaseFile;
        }
        Command::ConfigureCase { objective, settings } => {
            flow.configure_case(objective, settings).await?;
            state.screen = Screen::Strategy;
        }
        Command::AskCoach(draft) => {
            let request = flow.advice_request(&draft).await?;
            let advisor = flow.advisor();
            let tx = tx.clone();
            state.coach_pending = true;
            tokio::spawn(async move {
                let advice = request.send(advisor.as_ref()).await;
                let _ = tx.send(AppEvent::CoachAdvised(advice));
            });
        }
        Command::BeginHearing(strategy) => {
            flow.build_strategy(strategy).await?;
            let expired = tx.clone();
            flow.start_round(move || {
                let _ = expired.send(AppEvent::ClockExpired);
            })
            .await?;
            state.screen = Screen::Hearing;
            state.follow_transcript = true;
            state.notify("Court is in session. Press i to address the court.");
        }
        Command::SubmitArgument(text) => {
            let pending = flow.submit_argument(&text).await?;
            spawn_opponent(flow, pending, tx);
        }
        Command::RaiseObjection => {
            let left = flow.raise_objection().await?;
            state.notify(format!("Objection raised. {left} left."));
        }
        Command::Pause => {
            flow.pause()?;
            state.notify("Hearing paused for 10 seconds.");
        }
        Command::Conclude(reason) => {
            flow.conclude(reason).await?;
            show_results(flow, state).await?;
        }
        Command::ShowResults => show_results(flow, state).await?,
        Command::LeaveResults { show_badges } => {
            flow.leave_results().await?;
            state.verdict = None;
            if show_badges {
                load_badges(flow, state).await?;
                state.screen = Screen::Badges;
            } else {
                state.screen = Screen::ScenarioList;
            }
        }
        Command::OpenBadges => {
            load_badges(flow, state).await?;
            state.screen = Screen::Badges;
        }
    }
    Ok(())
}

fn spawn_opponent(
    flow: &SessionFlowController,
    pending: PendingExchange,
    tx: &UnboundedSender<AppEvent>,
) {
    let opponent = flow.opponent();
    let tx = tx.clone();
    tokio::spawn(async move {
        let reply = pending.send(opponent.as_ref()).await;
        let _ = tx.send(AppEvent::OpponentReplied(Box::new((pending, reply))));
    });
}

async fn show_results(flow: &mut SessionFlowController, state: &mut AppState) -> Result<()> {
    state.verdict = Some(flow.results().await?);
    state.mode = Mode::Normal;
    state.screen = Screen::Results;
    Ok(())
}

async fn load_badges(flow: &SessionFlowController, state: &mut AppState) -> Result<()> {
    let (records, summary) = flow.badge_collection().await?;
    state.badges = records;
    state.badge_summary = Some(summary);
    Ok(())
}

/// Applies a finished opponent request.
pub async fn opponent_replied(
    flow: &mut SessionFlowController,
    state: &mut AppState,
    pending: PendingExchange,
    reply: Result<OpponentReply>,
) {
    match flow.accept_opponent(&pending, reply).await {
        Ok(ExchangeOutcome::NextRound(round)) => {
            state.follow_transcript = true;
            state.notify(format!("Round {round}. Your turn."));
        }
        Ok(ExchangeOutcome::RoundsExhausted) => {
            state.follow_transcript = true;
            state.notify("All rounds argued. Press c to deliver your conclusion.");
        }
        Ok(ExchangeOutcome::Discarded) => {}
        Err(e) => state.report(&e),
    }
}

pub fn coach_advised(state: &mut AppState, advice: Result<CoachAdvice>) {
    state.coach_pending = false;
    match advice {
        Ok(advice) => state.coach_advice = Some(advice.text),
        Err(e) => state.report(&e),
    }
}

/// Advances the clock one second.
pub async fn tick(flow: &mut SessionFlowController, state: &mut AppState) {
    if let Err(e) = flow.tick().await {
        state.report(&e);
    }
}

/// The clock ran out: conclude the hearing on the user's behalf.
pub async fn clock_expired(
    flow: &mut SessionFlowController,
    state: &mut AppState,
    tx: &UnboundedSender<AppEvent>,
) {
    execute(Command::Conclude(ConclusionReason::TimeExpired), flow, state, tx).await;
    if state.screen == Screen::Results {
        state.notify("Time is up! The hearing is over.");
    }
}
