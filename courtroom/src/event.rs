//! Event bus for courtroom.
//!
//! All user input, timer ticks, and background-task results are normalised into
//! a single `AppEvent` enum and sent over a tokio unbounded MPSC channel. The
//! main loop receives from this channel and dispatches accordingly.
//!
//! Two independent intervals drive the render and logic cycles:
//! - **Render interval** (33 ms ≈ 30 FPS) triggers a `terminal.draw()` call.
//! - **Tick interval** (1 s) advances the debate clock by one second.

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

use courtroom_core::flow::PendingExchange;
use courtroom_core::responder::{CoachAdvice, OpponentReply};

/// Period of [`AppEvent::Tick`]; one debate-clock second.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);
const RENDER_PERIOD: Duration = Duration::from_millis(33);

/// All events the application can receive from any source.
#[derive(Debug)]
#[non_exhaustive]
pub enum AppEvent {
    /// A key press from the terminal (`KeyEventKind::Press` only).
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Terminal was resized to (columns, rows).
    Resize(u16, u16),
    /// One-second logic tick.
    Tick,
    /// Render tick (≈30 FPS).
    Render,
    /// The opponent task finished; carries the ticket it was spawned for.
    OpponentReplied(Box<(PendingExchange, courtroom_core::Result<OpponentReply>)>),
    /// The coach task finished.
    CoachAdvised(courtroom_core::Result<CoachAdvice>),
    /// The debate clock reached zero.
    ClockExpired,
    /// Quit signal.
    Quit,
}

/// Holds the sender and receiver ends of the unified event channel.
pub struct EventHandler {
    /// Send half; clone this for each background task that produces events.
    pub tx: mpsc::UnboundedSender<AppEvent>,
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the background task that feeds terminal input and timers into `tx`.
///
/// `reader.next().fuse()` keeps `select!` from polling a finished stream, and
/// only `KeyEventKind::Press` is forwarded so Windows does not double-fire keys.
/// Send errors are ignored; the task ends with the process.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut tick_interval = interval(TICK_PERIOD);
        let mut render_interval = interval(RENDER_PERIOD);
        let mut reader = EventStream::new();

        // The first interval tick completes immediately; skip it so the clock
        // does not lose a second at startup.
        tick_interval.tick().await;

        loop {
            let tick_tick = tick_interval.tick();
            let render_tick = render_interval.tick();
            let crossterm_event = reader.next().fuse();

            tokio::select! {
                _ = tick_tick => {
                    let _ = tx.send(AppEvent::Tick);
                }
                _ = render_tick => {
                    let _ = tx.send(AppEvent::Render);
                }
                maybe_event = crossterm_event => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) => {
                            if key.kind == KeyEventKind::Press {
                                let _ = tx.send(AppEvent::Key(key));
                            }
                        }
                        Some(Ok(Event::Resize(w, h))) => {
                            let _ = tx.send(AppEvent::Resize(w, h));
                        }
                        Some(Ok(Event::Mouse(mouse))) => {
                            let _ = tx.send(AppEvent::Mouse(mouse));
                        }
                        _ => {}
                    }
                }
            }
        }
    });
}
