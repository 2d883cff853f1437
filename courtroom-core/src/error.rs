//! Error types shared by every courtroom component.
//!
//! All variants are recoverable at the UI boundary: the caller either routes the
//! user back to an earlier screen (`SessionNotFound`) or shows an inline message.

use thiserror::Error;

/// Why a pause request was refused by the debate clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PauseRefusal {
    /// The case file was configured with pausing switched off.
    #[error("pausing is disabled for this session")]
    Disabled,
    /// All pauses in the per-session budget have been used.
    #[error("no pauses left")]
    BudgetExhausted,
    /// The clock is already paused and will resume on its own.
    #[error("the clock is already paused")]
    AlreadyPaused,
    /// The clock has not started, has expired, or was stopped.
    #[error("the clock is not running")]
    NotRunning,
}

/// A typed failure surfaced by the flow controller, clock, scoring engine or stores.
#[derive(Debug, Error)]
pub enum CourtroomError {
    /// No session record is persisted; the caller must return to scenario selection.
    #[error("no courtroom session in progress")]
    SessionNotFound,

    /// A field required by this transition is missing or out of range.
    #[error("cannot {action}: {reason}")]
    PreconditionFailed {
        action: &'static str,
        reason: String,
    },

    /// Pause requested while disabled, exhausted, or not applicable.
    #[error("pause not allowed: {0}")]
    PauseNotAllowed(PauseRefusal),

    /// A bounded in-round action was requested past its configured limit.
    #[error("{action} limit of {limit} reached")]
    ActionLimitExceeded { action: &'static str, limit: u32 },

    /// The simulated (or real) backend call failed.
    #[error("network error: {0}")]
    Network(String),

    /// The SQLite layer failed.
    #[error("storage error: {0}")]
    Storage(#[from] tokio_rusqlite::Error),

    /// A persisted record could not be encoded or decoded.
    #[error("session record is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CourtroomError {
    /// Creates a `PreconditionFailed` error.
    pub fn precondition(action: &'static str, reason: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            action,
            reason: reason.into(),
        }
    }

    /// Returns `true` when the caller should route back to the scenario list.
    pub fn requires_restart(&self) -> bool {
        matches!(self, Self::SessionNotFound)
    }
}

/// Result alias used throughout `courtroom-core`.
pub type Result<T, E = CourtroomError> = std::result::Result<T, E>;
