//! Gesture recognition boundary
//!
//! A recognizer turns one finished capture into one text phrase. The
//! controller does not care how: `StubRecognizer` picks a canned phrase,
//! a model-backed implementation can be swapped in at composition time.

use crate::capture::CameraFacing;
use anyhow::{Context, Result};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Phrases the stub recognizer can return
pub const RECOGNITION_PHRASES: [&str; 5] = [
    "Hello",
    "Thank you",
    "How are you?",
    "Nice to meet you",
    "Goodbye",
];

/// A finished capture handed to the recognizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipHandle {
    /// Cycle the clip was recorded in
    pub id: Uuid,
    /// Camera in use when recording started
    pub facing: CameraFacing,
    /// How long the recording ran
    pub duration: Duration,
}

/// Gesture recognizer trait
#[async_trait::async_trait]
pub trait Recognizer: Send + Sync {
    /// Recognize a clip
    ///
    /// Resolves with exactly one phrase, or fails.
    async fn recognize(&self, clip: &ClipHandle) -> Result<String>;

    /// Recognizer name for logging
    fn name(&self) -> &str;
}

/// Recognizer that ignores the clip and returns a random phrase
pub struct StubRecognizer {
    phrases: Vec<String>,
    latency: Duration,
}

impl StubRecognizer {
    pub fn new(phrases: Vec<String>, latency: Duration) -> Self {
        Self { phrases, latency }
    }

    /// Restrict the stub to a fixed phrase list
    pub fn with_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            phrases.into_iter().map(Into::into).collect(),
            Duration::ZERO,
        )
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

impl Default for StubRecognizer {
    fn default() -> Self {
        Self::with_phrases(RECOGNITION_PHRASES)
    }
}

#[async_trait::async_trait]
impl Recognizer for StubRecognizer {
    async fn recognize(&self, clip: &ClipHandle) -> Result<String> {
        debug!(
            "Stub recognizing clip {} ({:?} camera, {} ms)",
            clip.id,
            clip.facing,
            clip.duration.as_millis()
        );

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let phrase = self
            .phrases
            .choose(&mut rand::rng())
            .cloned()
            .context("Stub recognizer has no phrases configured")?;

        info!("Recognized phrase for clip {}: {}", clip.id, phrase);

        Ok(phrase)
    }

    fn name(&self) -> &str {
        "stub"
    }
}
