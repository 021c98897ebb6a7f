pub mod background;
pub mod frame_log;
pub mod grabber;
pub mod plan;
pub mod session_recorder;

pub use background::{BackgroundCapture, run_capture};
pub use frame_log::{FRAME_LOG_HEADER, FrameInfoLog};
pub use grabber::{CameraSettings, CaptureError, VideoGrabber};
pub use plan::{OutputMode, RecordingPlan};
pub use session_recorder::SessionRecorder;
