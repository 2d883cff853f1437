//! Core of the courtroom practice simulator.
//!
//! Everything here is UI-agnostic: session persistence, the badge ledger, the
//! static catalogs, the session flow state machine, the debate clock, scoring,
//! and the simulated opponent and coach. The `courtroom` binary drives it from a
//! terminal UI.

pub mod catalog;
pub mod clock;
pub mod db;
pub mod error;
pub mod flow;
pub mod responder;
pub mod schema;
pub mod scoring;
pub mod store;
pub mod types;

pub use error::{CourtroomError, Result};
pub use flow::{ConclusionReason, ExchangeOutcome, SessionFlowController};
