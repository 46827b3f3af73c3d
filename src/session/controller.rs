use super::config::SessionConfig;
use super::state::{
    ActionOutcome, Cycle, Phase, Rejection, ScheduledTask, Session, SessionNotice,
    SessionSnapshot,
};
use super::stats::SessionStats;
use crate::capture::{CameraFacing, CaptureSource, PermissionStatus, PreviewHandle};
use crate::recognizer::{ClipHandle, Recognizer};
use crate::speech::SpeechOutput;
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Commands processed by the controller task
enum Command {
    Start {
        reply: oneshot::Sender<ActionOutcome>,
    },
    Stop {
        reply: oneshot::Sender<ActionOutcome>,
    },
    ToggleCameraFacing {
        reply: oneshot::Sender<CameraFacing>,
    },
    Speak {
        reply: oneshot::Sender<ActionOutcome>,
    },
    PermissionChanged {
        status: PermissionStatus,
        reply: oneshot::Sender<()>,
    },
    Stats {
        reply: oneshot::Sender<SessionStats>,
    },
    Shutdown { reply: oneshot::Sender<()> },
    /// Auto-stop timer fired for a cycle
    Deadline { cycle_id: Uuid },
    /// Recognizer finished (or failed) for a cycle
    Recognized {
        cycle_id: Uuid,
        result: Result<String>,
    },
}

/// Handle to the translation session
///
/// The session itself lives in a spawned task that is the only writer.
/// Handles are cheap to clone; every action is a message to that task and
/// state comes back through a watch channel. The task stops when
/// `shutdown()` is called or the last handle is dropped, aborting any
/// pending timer or recognizer call.
#[derive(Clone)]
pub struct SessionController {
    commands: mpsc::Sender<Command>,
    state_rx: watch::Receiver<SessionSnapshot>,
    capture: Arc<dyn CaptureSource>,
}

impl SessionController {
    /// Spawn the controller task on the current tokio runtime
    pub fn spawn(
        config: SessionConfig,
        capture: Arc<dyn CaptureSource>,
        recognizer: Arc<dyn Recognizer>,
        speech: Arc<dyn SpeechOutput>,
    ) -> Self {
        let permission = capture.permission_status();
        let session = Session::new(config.initial_facing, permission);

        info!(
            "Creating session controller (capture={}, recognizer={}, speech={}, auto_stop={}ms, processing_delay={}ms)",
            capture.name(),
            recognizer.name(),
            speech.name(),
            config.auto_stop.as_millis(),
            config.processing_delay.as_millis()
        );

        let (state_tx, state_rx) = watch::channel(session.snapshot());
        let (commands, command_rx) = mpsc::channel(32);

        let actor = SessionActor {
            config,
            capture: Arc::clone(&capture),
            recognizer,
            speech,
            session,
            stats: SessionStats::new(),
            state_tx,
            callbacks: commands.downgrade(),
        };

        tokio::spawn(actor.run(command_rx));

        Self {
            commands,
            state_rx,
            capture,
        }
    }

    /// Begin recording (Idle/Result -> Recording)
    pub async fn start(&self) -> Result<ActionOutcome> {
        self.request(|reply| Command::Start { reply }).await
    }

    /// Stop recording early (Recording -> Processing)
    pub async fn stop(&self) -> Result<ActionOutcome> {
        self.request(|reply| Command::Stop { reply }).await
    }

    /// Switch between front and back camera, returns the new facing
    pub async fn toggle_camera_facing(&self) -> Result<CameraFacing> {
        self.request(|reply| Command::ToggleCameraFacing { reply }).await
    }

    /// Read the recognized text aloud
    pub async fn speak(&self) -> Result<ActionOutcome> {
        self.request(|reply| Command::Speak { reply }).await
    }

    /// Ask the capture source for camera access again
    pub async fn request_permission(&self) -> Result<PermissionStatus> {
        let status = self
            .capture
            .request_permission()
            .await
            .context("Failed to request camera permission")?;

        self.request(|reply| Command::PermissionChanged { status, reply }).await?;

        Ok(status)
    }

    /// Live preview for the currently selected camera
    pub fn preview(&self) -> PreviewHandle {
        let facing = self.state_rx.borrow().camera_facing;
        self.capture.preview(facing)
    }

    /// Latest published state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_rx.clone()
    }

    /// Lifetime counters
    pub async fn stats(&self) -> Result<SessionStats> {
        self.request(|reply| Command::Stats { reply }).await
    }

    /// Tear down the session, cancelling any pending timer or recognizer call
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();

        self.commands
            .send(build(reply))
            .await
            .map_err(|_| anyhow!("Session controller has shut down"))?;

        rx.await.context("Session controller dropped the request")
    }
}

/// Owner of the session state
struct SessionActor {
    config: SessionConfig,
    capture: Arc<dyn CaptureSource>,
    recognizer: Arc<dyn Recognizer>,
    speech: Arc<dyn SpeechOutput>,
    session: Session,
    stats: SessionStats,
    state_tx: watch::Sender<SessionSnapshot>,

    /// Weak so pending timers do not keep the task alive
    callbacks: mpsc::WeakSender<Command>,
}

impl SessionActor {
    async fn run(mut self, mut command_rx: mpsc::Receiver<Command>) {
        info!("Session controller task started");

        while let Some(command) = command_rx.recv().await {
            match command {
                Command::Start { reply } => {
                    let outcome = self.start();
                    let _ = reply.send(outcome);
                }
                Command::Stop { reply } => {
                    let outcome = self.stop(false);
                    let _ = reply.send(outcome);
                }
                Command::ToggleCameraFacing { reply } => {
                    let facing = self.toggle_camera_facing();
                    let _ = reply.send(facing);
                }
                Command::Speak { reply } => {
                    let outcome = self.speak();
                    let _ = reply.send(outcome);
                }
                Command::PermissionChanged { status, reply } => {
                    self.session.permission = status;
                    self.publish();
                    let _ = reply.send(());
                }
                Command::Stats { reply } => {
                    let _ = reply.send(self.stats.clone());
                }
                Command::Shutdown { reply } => {
                    self.session.cancel_pending();
                    let _ = reply.send(());
                    break;
                }
                Command::Deadline { cycle_id } => {
                    if !self.session.is_current(cycle_id) {
                        debug!("Ignoring auto-stop for superseded cycle {}", cycle_id);
                        continue;
                    }
                    self.stop(true);
                }
                Command::Recognized { cycle_id, result } => {
                    self.commit_recognition(cycle_id, result);
                }
            }
        }

        self.session.cancel_pending();
        info!("Session controller task stopped");
    }

    fn start(&mut self) -> ActionOutcome {
        if !self.session.phase.can_start() {
            debug!("Ignoring start() while {:?}", self.session.phase);
            return ActionOutcome::Ignored(Rejection::WrongPhase(self.session.phase));
        }

        let permission = self.capture.permission_status();
        if permission != self.session.permission {
            self.session.permission = permission;
            self.publish();
        }
        if !permission.is_granted() {
            warn!("Ignoring start(): camera permission is {:?}", permission);
            return ActionOutcome::Ignored(Rejection::PermissionNotGranted(permission));
        }

        let cycle = Cycle {
            id: Uuid::new_v4(),
            facing: self.session.camera_facing,
            started_at: Instant::now(),
        };
        let cycle_id = cycle.id;

        info!("Starting recording {} ({:?} camera)", cycle_id, cycle.facing);

        self.session.recognized_text = None;
        self.session.last_notice = None;
        self.session.cycle = Some(cycle);
        self.session.transition(Phase::Recording);
        self.session.recording_deadline = Some(self.schedule_auto_stop(cycle_id));
        self.stats.cycles_started += 1;

        self.publish();
        ActionOutcome::Applied
    }

    fn stop(&mut self, timer_fired: bool) -> ActionOutcome {
        if self.session.phase != Phase::Recording {
            debug!("Ignoring stop() while {:?}", self.session.phase);
            return ActionOutcome::Ignored(Rejection::WrongPhase(self.session.phase));
        }

        let Some(cycle) = self.session.cycle.as_ref() else {
            error!("Recording without an active cycle");
            return ActionOutcome::Ignored(Rejection::WrongPhase(self.session.phase));
        };

        let now = Instant::now();
        let clip = ClipHandle {
            id: cycle.id,
            facing: cycle.facing,
            duration: now.duration_since(cycle.started_at),
        };

        if let Some(deadline) = self.session.recording_deadline.take() {
            if !timer_fired {
                debug!(
                    "Cancelled auto-stop for {} ({} ms early)",
                    clip.id,
                    deadline.due().saturating_duration_since(now).as_millis()
                );
            }
        }

        if timer_fired {
            info!(
                "Auto-stopping recording {} after {} ms",
                clip.id,
                clip.duration.as_millis()
            );
            self.stats.auto_stops += 1;
        } else {
            info!(
                "Stopping recording {} after {} ms",
                clip.id,
                clip.duration.as_millis()
            );
            self.stats.manual_stops += 1;
        }

        self.session.transition(Phase::Processing);
        self.session.pending_recognition = Some(self.schedule_recognition(clip));

        self.publish();
        ActionOutcome::Applied
    }

    fn commit_recognition(&mut self, cycle_id: Uuid, result: Result<String>) {
        if self.session.phase != Phase::Processing || !self.session.is_current(cycle_id) {
            debug!("Discarding stale recognition result for cycle {}", cycle_id);
            return;
        }

        self.session.pending_recognition = None;

        match result {
            Ok(text) if !text.trim().is_empty() => {
                info!("Recognition complete for {}: {}", cycle_id, text);
                self.session.recognized_text = Some(text);
                self.session.transition(Phase::Result);
                self.stats.cycles_completed += 1;
            }
            Ok(_) => {
                self.fail_recognition(cycle_id, anyhow!("Recognizer returned no text"));
            }
            Err(e) => {
                self.fail_recognition(cycle_id, e);
            }
        }

        self.publish();
    }

    fn fail_recognition(&mut self, cycle_id: Uuid, err: anyhow::Error) {
        warn!("Recognition failed for {}: {:#}", cycle_id, err);

        self.session.recognized_text = None;
        self.session.last_notice = Some(SessionNotice::RecognitionFailed {
            message: format!("{:#}", err),
        });
        self.session.transition(Phase::Idle);
        self.stats.recognition_failures += 1;
    }

    fn toggle_camera_facing(&mut self) -> CameraFacing {
        self.session.camera_facing = self.session.camera_facing.flipped();
        info!("Camera flipped to {:?}", self.session.camera_facing);

        self.publish();
        self.session.camera_facing
    }

    fn speak(&mut self) -> ActionOutcome {
        let text = match (&self.session.phase, &self.session.recognized_text) {
            (Phase::Result, Some(text)) if !text.is_empty() => text.clone(),
            _ => {
                debug!("Ignoring speak() while {:?}", self.session.phase);
                return ActionOutcome::Ignored(Rejection::NothingToSpeak);
            }
        };

        match self.speech.speak(&text, &self.config.speech) {
            Ok(()) => {
                self.stats.utterances += 1;
            }
            Err(e) => {
                warn!("Speech output failed: {:#}", e);
                self.stats.speech_failures += 1;
                self.session.last_notice = Some(SessionNotice::SpeechFailed {
                    message: format!("{:#}", e),
                });
                self.publish();
            }
        }

        ActionOutcome::Applied
    }

    fn schedule_auto_stop(&self, cycle_id: Uuid) -> ScheduledTask {
        let due = Instant::now() + self.config.auto_stop;
        let callbacks = self.callbacks.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(due).await;

            if let Some(tx) = callbacks.upgrade() {
                let _ = tx.send(Command::Deadline { cycle_id }).await;
            }
        });

        ScheduledTask::new(handle, due)
    }

    fn schedule_recognition(&self, clip: ClipHandle) -> ScheduledTask {
        let due = Instant::now() + self.config.processing_delay;
        let timeout = self.config.recognition_timeout;
        let recognizer = Arc::clone(&self.recognizer);
        let callbacks = self.callbacks.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(due).await;

            let recognition = recognizer.recognize(&clip);
            let result = match timeout {
                Some(limit) => match tokio::time::timeout(limit, recognition).await {
                    Ok(result) => result,
                    Err(_) => Err(anyhow!("Recognizer timed out after {:?}", limit)),
                },
                None => recognition.await,
            };

            if let Some(tx) = callbacks.upgrade() {
                let _ = tx
                    .send(Command::Recognized {
                        cycle_id: clip.id,
                        result,
                    })
                    .await;
            }
        });

        ScheduledTask::new(handle, due)
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.session.snapshot());
    }
}
