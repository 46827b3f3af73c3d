//! Session phases and the state published to the presentation layer

use crate::capture::{CameraFacing, PermissionStatus};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

/// Discrete state of a capture cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing recorded yet, or the last recognition failed
    #[default]
    Idle,
    /// Camera is recording a gesture
    Recording,
    /// Waiting for the recognizer
    Processing,
    /// Recognized text is available
    Result,
}

impl Phase {
    /// Human-readable label for status displays
    pub fn description(&self) -> &'static str {
        match self {
            Phase::Idle => "Record sign language to see results",
            Phase::Recording => "Recording",
            Phase::Processing => "Processing...",
            Phase::Result => "Recognized text",
        }
    }

    /// Whether `start()` is accepted in this phase
    pub fn can_start(&self) -> bool {
        matches!(self, Phase::Idle | Phase::Result)
    }

    /// Edges of the session state machine
    ///
    /// Processing -> Idle is the recognizer failure path.
    pub fn can_transition_to(&self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Idle, Phase::Recording)
                | (Phase::Result, Phase::Recording)
                | (Phase::Recording, Phase::Processing)
                | (Phase::Processing, Phase::Result)
                | (Phase::Processing, Phase::Idle)
        )
    }
}

/// Transient problem reported alongside the published state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionNotice {
    /// The recognizer failed, timed out or returned nothing; retry with `start()`
    RecognitionFailed { message: String },
    /// The speech output refused an utterance
    SpeechFailed { message: String },
}

/// Read-only view of the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub camera_facing: CameraFacing,
    pub recognized_text: Option<String>,
    pub permission: PermissionStatus,
    pub last_notice: Option<SessionNotice>,
    /// Cycle currently shown (None before the first recording)
    pub cycle_id: Option<Uuid>,
}

/// Why an action was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The action is not valid in this phase
    WrongPhase(Phase),
    /// `start()` without camera access
    PermissionNotGranted(PermissionStatus),
    /// `speak()` without recognized text
    NothingToSpeak,
}

/// Result of dispatching an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    Ignored(Rejection),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied)
    }
}

/// A spawned timer or callback owned by the session
///
/// Dropping it aborts the task, so clearing the slot is enough to cancel.
pub(crate) struct ScheduledTask {
    handle: JoinHandle<()>,
    due: Instant,
}

impl ScheduledTask {
    pub(crate) fn new(handle: JoinHandle<()>, due: Instant) -> Self {
        Self { handle, due }
    }

    pub(crate) fn due(&self) -> Instant {
        self.due
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// The in-flight cycle
pub(crate) struct Cycle {
    pub(crate) id: Uuid,
    pub(crate) facing: CameraFacing,
    pub(crate) started_at: Instant,
}

/// The mutable unit of work, owned by the controller task
pub(crate) struct Session {
    pub(crate) phase: Phase,
    pub(crate) camera_facing: CameraFacing,
    pub(crate) recognized_text: Option<String>,
    pub(crate) permission: PermissionStatus,
    pub(crate) last_notice: Option<SessionNotice>,
    pub(crate) cycle: Option<Cycle>,
    pub(crate) recording_deadline: Option<ScheduledTask>,
    pub(crate) pending_recognition: Option<ScheduledTask>,
}

impl Session {
    pub(crate) fn new(camera_facing: CameraFacing, permission: PermissionStatus) -> Self {
        Self {
            phase: Phase::Idle,
            camera_facing,
            recognized_text: None,
            permission,
            last_notice: None,
            cycle: None,
            recording_deadline: None,
            pending_recognition: None,
        }
    }

    pub(crate) fn cycle_id(&self) -> Option<Uuid> {
        self.cycle.as_ref().map(|c| c.id)
    }

    /// Whether a callback scheduled for `cycle_id` may still act
    pub(crate) fn is_current(&self, cycle_id: Uuid) -> bool {
        self.cycle_id() == Some(cycle_id)
    }

    pub(crate) fn transition(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.phase,
            next
        );
        self.phase = next;
    }

    /// Drop every pending timer and callback
    pub(crate) fn cancel_pending(&mut self) {
        self.recording_deadline = None;
        self.pending_recognition = None;
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            camera_facing: self.camera_facing,
            recognized_text: self.recognized_text.clone(),
            permission: self.permission,
            last_notice: self.last_notice.clone(),
            cycle_id: self.cycle_id(),
        }
    }
}
