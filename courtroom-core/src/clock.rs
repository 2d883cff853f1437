//! Countdown clock for the live debate round.
//!
//! The clock is a plain state machine advanced by discrete events: the host calls
//! [`DebateClock::tick`] once per elapsed second, and [`pause`](DebateClock::pause)
//! or [`stop`](DebateClock::stop) in response to user actions. No timers live here,
//! so every transition is deterministic and testable without waiting.
//!
//! ```text
//! Idle --start--> Running --tick(0 left)--> Expired
//!                  |   ^
//!            pause |   | 10 ticks
//!                  v   |
//!                 Paused
//! Running/Paused --stop--> Stopped
//! ```
//!
//! `on_expire` fires at most once. Completion is tracked by an explicit flag, so a
//! `stop()` after expiry is a no-op and a `tick()` after `stop()` never fires.

use std::fmt;

use tracing::debug;

use crate::error::{CourtroomError, PauseRefusal, Result};

/// Number of pauses allowed per live round.
pub const PAUSE_BUDGET: u8 = 3;

/// Seconds (ticks) a pause lasts before the clock resumes on its own.
pub const PAUSE_SECONDS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Running,
    Paused { resumes_in: u32 },
    Expired,
    Stopped,
}

/// What a single [`DebateClock::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// One second was deducted.
    Counted { remaining: u32 },
    /// The clock is paused; the countdown was left untouched.
    Held { resumes_in: u32 },
    /// The pause ran out on this tick; counting restarts on the next one.
    Resumed,
    /// Remaining time reached zero on this tick and `on_expire` fired.
    Expired,
    /// Idle, expired or stopped: nothing happened.
    Inert,
}

pub struct DebateClock {
    state: ClockState,
    duration: u32,
    remaining: u32,
    pause_enabled: bool,
    pauses_used: u8,
    finished: bool,
    on_expire: Option<Box<dyn FnOnce() + Send>>,
}

impl fmt::Debug for DebateClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebateClock")
            .field("state", &self.state)
            .field("duration", &self.duration)
            .field("remaining", &self.remaining)
            .field("pause_enabled", &self.pause_enabled)
            .field("pauses_used", &self.pauses_used)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl DebateClock {
    /// Creates an idle clock. `pause_enabled` comes from the session settings.
    pub fn new(pause_enabled: bool) -> Self {
        Self {
            state: ClockState::Idle,
            duration: 0,
            remaining: 0,
            pause_enabled,
            pauses_used: 0,
            finished: false,
            on_expire: None,
        }
    }

    /// Begins the countdown from `duration_secs`.
    ///
    /// Only an idle clock can be started; later calls are ignored. A zero duration
    /// expires immediately.
    pub fn start(&mut self, duration_secs: u32, on_expire: impl FnOnce() + Send + 'static) {
        if self.state != ClockState::Idle {
            return;
        }
        self.duration = duration_secs;
        self.remaining = duration_secs;
        self.on_expire = Some(Box::new(on_expire));
        self.state = ClockState::Running;
        if duration_secs == 0 {
            self.expire();
        }
    }

    /// Advances the clock by one second.
    pub fn tick(&mut self) -> ClockEvent {
        match self.state {
            ClockState::Running => {
                self.remaining = self.remaining.saturating_sub(1);
                if self.remaining == 0 {
                    self.expire();
                    ClockEvent::Expired
                } else {
                    ClockEvent::Counted {
                        remaining: self.remaining,
                    }
                }
            }
            ClockState::Paused { resumes_in } => {
                let resumes_in = resumes_in.saturating_sub(1);
                if resumes_in == 0 {
                    self.state = ClockState::Running;
                    debug!(remaining = self.remaining, "debate clock resumed");
                    ClockEvent::Resumed
                } else {
                    self.state = ClockState::Paused { resumes_in };
                    ClockEvent::Held { resumes_in }
                }
            }
            ClockState::Idle | ClockState::Expired | ClockState::Stopped => ClockEvent::Inert,
        }
    }

    /// Suspends the countdown for [`PAUSE_SECONDS`] ticks.
    ///
    /// # Errors
    ///
    /// `PauseNotAllowed` when pausing is disabled, the clock is already paused or
    /// not running, or all [`PAUSE_BUDGET`] pauses have been used.
    pub fn pause(&mut self) -> Result<()> {
        if !self.pause_enabled {
            return Err(CourtroomError::PauseNotAllowed(PauseRefusal::Disabled));
        }
        match self.state {
            ClockState::Paused { .. } => {
                Err(CourtroomError::PauseNotAllowed(PauseRefusal::AlreadyPaused))
            }
            ClockState::Running if self.pauses_used >= PAUSE_BUDGET => {
                Err(CourtroomError::PauseNotAllowed(PauseRefusal::BudgetExhausted))
            }
            ClockState::Running => {
                self.pauses_used += 1;
                self.state = ClockState::Paused {
                    resumes_in: PAUSE_SECONDS,
                };
                debug!(pauses_used = self.pauses_used, "debate clock paused");
                Ok(())
            }
            ClockState::Idle | ClockState::Expired | ClockState::Stopped => {
                Err(CourtroomError::PauseNotAllowed(PauseRefusal::NotRunning))
            }
        }
    }

    /// Halts the countdown permanently.
    ///
    /// Returns `false` if the clock had already expired or been stopped, in which
    /// case nothing changes.
    pub fn stop(&mut self) -> bool {
        if self.finished {
            return false;
        }
        self.finished = true;
        self.on_expire = None;
        self.state = ClockState::Stopped;
        true
    }

    fn expire(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.remaining = 0;
        self.state = ClockState::Expired;
        debug!(duration = self.duration, "debate clock expired");
        if let Some(on_expire) = self.on_expire.take() {
            on_expire();
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn pauses_left(&self) -> u8 {
        if self.pause_enabled {
            PAUSE_BUDGET.saturating_sub(self.pauses_used)
        } else {
            0
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, ClockState::Paused { .. })
    }

    pub fn has_expired(&self) -> bool {
        self.state == ClockState::Expired
    }

    /// Remaining time as a fraction of the full duration, for progress bars.
    pub fn fraction_remaining(&self) -> f64 {
        if self.duration == 0 {
            0.0
        } else {
            f64::from(self.remaining) / f64::from(self.duration)
        }
    }
}
