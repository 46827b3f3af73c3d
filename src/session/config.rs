use crate::capture::CameraFacing;
use crate::speech::SpeechOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the session controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long a recording runs before it stops on its own
    /// Default: 5 seconds
    pub auto_stop: Duration,

    /// Delay between stopping and invoking the recognizer
    /// Default: 1.5 seconds
    pub processing_delay: Duration,

    /// Upper bound on a single recognizer call (None = wait forever)
    pub recognition_timeout: Option<Duration>,

    /// Voice settings used by `speak()`
    pub speech: SpeechOptions,

    /// Camera selected when the controller starts
    pub initial_facing: CameraFacing,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_stop: Duration::from_millis(5000),
            processing_delay: Duration::from_millis(1500),
            recognition_timeout: Some(Duration::from_secs(10)),
            speech: SpeechOptions::default(),
            initial_facing: CameraFacing::Front, // Signer faces the screen
        }
    }
}
