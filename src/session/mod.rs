//! Translation session management
//!
//! This module provides the `SessionController` that drives one
//! capture-translate-speak cycle at a time:
//! - Recording with an auto-stop deadline
//! - Simulated processing delay followed by one recognizer call
//! - Publishing phase, recognized text and camera facing to subscribers
//! - Handing recognized text to the speech output on request

mod config;
mod controller;
mod state;
mod stats;

pub use config::SessionConfig;
pub use controller::SessionController;
pub use state::{ActionOutcome, Phase, Rejection, SessionNotice, SessionSnapshot};
pub use stats::SessionStats;
