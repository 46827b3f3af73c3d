pub mod capture;
pub mod config;
pub mod recognizer;
pub mod session;
pub mod speech;

pub use capture::{CameraFacing, CaptureSource, PermissionStatus, PreviewHandle, SimulatedCamera};
pub use config::Config;
pub use recognizer::{ClipHandle, Recognizer, StubRecognizer, RECOGNITION_PHRASES};
pub use session::{
    ActionOutcome, Phase, Rejection, SessionConfig, SessionController, SessionNotice,
    SessionSnapshot, SessionStats,
};
pub use speech::{LoggingSpeechOutput, SpeechOptions, SpeechOutput};
