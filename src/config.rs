use crate::capture::CameraFacing;
use crate::recognizer::RECOGNITION_PHRASES;
use crate::session::SessionConfig;
use crate::speech::SpeechOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub timing: TimingConfig,
    pub speech: SpeechOptions,
    pub recognizer: RecognizerConfig,
    pub camera: CameraConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub auto_stop_ms: u64,
    pub processing_delay_ms: u64,
    /// 0 disables the timeout
    pub recognition_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            auto_stop_ms: 5000,
            processing_delay_ms: 1500,
            recognition_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    pub phrases: Vec<String>,
    /// Extra latency added by the stub on top of the processing delay
    pub latency_ms: u64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            phrases: RECOGNITION_PHRASES.iter().map(|p| p.to_string()).collect(),
            latency_ms: 0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub facing: CameraFacing,
}

impl Config {
    /// Load `<path>.toml` (optional) with `SIGN_TRANSLATOR__SECTION__KEY` overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("SIGN_TRANSLATOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid sign translator configuration")
    }

    /// Runtime settings for the session controller
    pub fn session_config(&self) -> SessionConfig {
        let recognition_timeout = match self.timing.recognition_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        SessionConfig {
            auto_stop: Duration::from_millis(self.timing.auto_stop_ms),
            processing_delay: Duration::from_millis(self.timing.processing_delay_ms),
            recognition_timeout,
            speech: self.speech.clone(),
            initial_facing: self.camera.facing,
        }
    }

    pub fn recognizer_latency(&self) -> Duration {
        Duration::from_millis(self.recognizer.latency_ms)
    }
}
