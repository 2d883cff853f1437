//! courtroom: a terminal courtroom-debate trainer.
//!
//! Entry point for the `courtroom` binary. Wires together the terminal lifecycle
//! (`tui`), the unified event bus (`event`), screen rendering (`ui`), and the
//! session flow controller from `courtroom-core` backed by WAL-mode SQLite.
//!
//! # Startup sequence
//!
//! 1. Create `.courtroom/` and install file logging, so config errors are logged.
//! 2. Load config and theme. Both are read-only and safe before terminal init.
//! 3. `install_panic_hook()` so the terminal is restored before a panic prints.
//! 4. `register_sigterm()`, polled in the event loop heartbeat.
//! 5. Open the database and prune sessions left behind by earlier runs.
//! 6. `init_tui()`, then the event channel and `spawn_event_task()`.
//!
//! `restore_tui()` is called after the event loop exits (quit key, SIGTERM, or
//! channel close). Inside the loop `?` is only used in the Render arm.

mod app;
mod command;
mod config;
mod event;
mod logging;
mod theme;
mod tui;
mod ui;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{error, info};

use courtroom_core::db::{self, SqliteBadgeLedger, SqliteSessionStore};
use courtroom_core::responder::{MockCoach, MockOpponent};
use courtroom_core::scoring::{ScoringEngine, SeededDice};
use courtroom_core::store::SessionStore;
use courtroom_core::SessionFlowController;

use crate::event::AppEvent;
use crate::ui::keybindings::{handle_key, handle_mouse, KeyAction};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let data_dir = std::path::Path::new(config::DATA_DIR);
    std::fs::create_dir_all(data_dir)?;
    let _log_guard = logging::init(data_dir);

    let config = config::Config::load();
    let theme = theme::Theme::from_name(&config.theme);
    let mut state = app::AppState::default();

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = db::open_db(&config.db_path.to_string_lossy())
        .await
        .map_err(std::io::Error::other)?;
    let store = Arc::new(SqliteSessionStore::new(conn.clone()));
    match db::prune_stale_sessions(&conn, store.run_id()).await {
        Ok(removed) if removed > 0 => info!(removed, "pruned sessions from earlier runs"),
        Ok(_) => {}
        Err(e) => error!(error = %e, "failed to prune stale sessions"),
    }
    let ledger = Arc::new(SqliteBadgeLedger::new(conn));
    let scoring = ScoringEngine::new(ledger, SeededDice::from_entropy());
    let mut flow = SessionFlowController::new(
        store.clone(),
        scoring,
        Arc::new(MockOpponent::new(config.opponent_latency())),
        Arc::new(MockCoach::new(config.coach_latency())),
    );
    info!(run_id = store.run_id(), db = %config.db_path.display(), "courtroom started");

    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let tx = handler.tx;
    let mut rx = handler.rx;

    'event_loop: loop {
        tokio::select! {
            // Without this arm a quiescent terminal blocks forever in rx.recv()
            // and the SIGTERM flag is never polled.
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        terminal.draw(|frame| ui::render(frame, &mut state, flow.live(), &theme))?;
                    }
                    Some(AppEvent::Key(key)) => {
                        if state.mode == app::Mode::Normal {
                            state.status = None;
                        }
                        match handle_key(key, &mut state, flow.live()) {
                            KeyAction::Quit => break 'event_loop,
                            KeyAction::Run(cmd) => command::execute(cmd, &mut flow, &mut state, &tx).await,
                            KeyAction::Continue => {}
                        }
                    }
                    Some(AppEvent::Mouse(mouse)) => {
                        handle_mouse(mouse, &mut state);
                    }
                    Some(AppEvent::Resize(_, _)) => {
                        // frame.area() picks up the new size on the next Render.
                    }
                    Some(AppEvent::Tick) => command::tick(&mut flow, &mut state).await,
                    Some(AppEvent::OpponentReplied(reply)) => {
                        let (pending, reply) = *reply;
                        command::opponent_replied(&mut flow, &mut state, pending, reply).await;
                    }
                    Some(AppEvent::CoachAdvised(advice)) => command::coach_advised(&mut state, advice),
                    Some(AppEvent::ClockExpired) => {
                        command::clock_expired(&mut flow, &mut state, &tx).await;
                    }
                    Some(AppEvent::Quit) | None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    // The session does not outlive the process.
    if let Err(e) = store.clear().await {
        error!(error = %e, "failed to clear session on exit");
    }
    tui::restore_tui()?;
    info!("courtroom exited");
    Ok(())
}
