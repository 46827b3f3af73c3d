//! Camera capture boundary
//!
//! The session controller only needs three things from the camera:
//! - the current permission status (checked before every recording)
//! - a way to ask for permission again after a denial
//! - a preview handle for the currently selected facing

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use tracing::info;

/// Camera permission as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    #[default]
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }

    fn to_u8(self) -> u8 {
        match self {
            PermissionStatus::Granted => 0,
            PermissionStatus::Denied => 1,
            PermissionStatus::Undetermined => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => PermissionStatus::Granted,
            1 => PermissionStatus::Denied,
            _ => PermissionStatus::Undetermined,
        }
    }
}

/// Which camera the live preview uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CameraFacing {
    /// Selfie camera (default, the signer faces the screen)
    #[default]
    Front,
    Back,
}

impl CameraFacing {
    /// The other camera
    pub fn flipped(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }
}

/// Renderable live preview handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    /// Camera the preview is bound to
    pub facing: CameraFacing,
    /// Name of the capture source that produced it
    pub source: String,
}

/// Camera capture trait
///
/// Platform implementations wrap the OS camera API. `SimulatedCamera`
/// stands in for it in tests and the demo binary.
#[async_trait::async_trait]
pub trait CaptureSource: Send + Sync {
    /// Current permission status, without prompting
    fn permission_status(&self) -> PermissionStatus;

    /// Prompt for camera access
    ///
    /// Resolves to `Granted` or `Denied`.
    async fn request_permission(&self) -> Result<PermissionStatus>;

    /// Live preview for the given camera
    fn preview(&self, facing: CameraFacing) -> PreviewHandle;

    /// Capture source name for logging
    fn name(&self) -> &str;
}

/// In-process camera with scripted permission behavior
pub struct SimulatedCamera {
    status: AtomicU8,
    grant_on_request: AtomicBool,
}

impl SimulatedCamera {
    pub fn new(initial: PermissionStatus, grant_on_request: bool) -> Self {
        Self {
            status: AtomicU8::new(initial.to_u8()),
            grant_on_request: AtomicBool::new(grant_on_request),
        }
    }

    /// Camera that already has access
    pub fn granted() -> Self {
        Self::new(PermissionStatus::Granted, true)
    }

    /// Decide what the next permission prompt resolves to
    pub fn set_grant_on_request(&self, grant: bool) {
        self.grant_on_request.store(grant, Ordering::SeqCst);
    }

    /// Revoke or grant access out of band (e.g. from system settings)
    pub fn set_status(&self, status: PermissionStatus) {
        self.status.store(status.to_u8(), Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl CaptureSource for SimulatedCamera {
    fn permission_status(&self) -> PermissionStatus {
        PermissionStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    async fn request_permission(&self) -> Result<PermissionStatus> {
        let status = if self.grant_on_request.load(Ordering::SeqCst) {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };

        self.status.store(status.to_u8(), Ordering::SeqCst);
        info!("Camera permission request resolved: {:?}", status);

        Ok(status)
    }

    fn preview(&self, facing: CameraFacing) -> PreviewHandle {
        PreviewHandle {
            facing,
            source: self.name().to_string(),
        }
    }

    fn name(&self) -> &str {
        "simulated-camera"
    }
}
