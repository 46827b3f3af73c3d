//! Text-to-speech boundary

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Voice settings passed with every utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechOptions {
    /// BCP-47 language tag
    pub language: String,
    /// 1.0 = normal pitch
    pub pitch: f32,
    /// 1.0 = normal speed
    pub rate: f32,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            pitch: 1.0,
            rate: 0.9, // Slightly slower for clarity
        }
    }
}

/// Speech synthesizer trait
///
/// `speak` enqueues an utterance and returns without waiting for playback.
/// Overlapping calls are passed straight to the synthesizer, which does its
/// own queuing.
pub trait SpeechOutput: Send + Sync {
    fn speak(&self, text: &str, options: &SpeechOptions) -> Result<()>;

    /// Synthesizer name for logging
    fn name(&self) -> &str;
}

/// Synthesizer that only logs what it would say
#[derive(Debug, Default)]
pub struct LoggingSpeechOutput;

impl SpeechOutput for LoggingSpeechOutput {
    fn speak(&self, text: &str, options: &SpeechOptions) -> Result<()> {
        info!(
            "Speaking \"{}\" (language={}, pitch={:.1}, rate={:.1})",
            text, options.language, options.pitch, options.rate
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
