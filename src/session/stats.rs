use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters over the lifetime of a session controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// When the controller was spawned
    pub started_at: DateTime<Utc>,

    /// Recordings started
    pub cycles_started: usize,

    /// Cycles that reached Result
    pub cycles_completed: usize,

    /// Recordings stopped by the operator
    pub manual_stops: usize,

    /// Recordings stopped by the auto-stop timer
    pub auto_stops: usize,

    /// Recognizer errors, timeouts and empty results
    pub recognition_failures: usize,

    /// Utterances handed to the speech output
    pub utterances: usize,

    /// Utterances the speech output refused
    pub speech_failures: usize,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            cycles_started: 0,
            cycles_completed: 0,
            manual_stops: 0,
            auto_stops: 0,
            recognition_failures: 0,
            utterances: 0,
            speech_failures: 0,
        }
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}
