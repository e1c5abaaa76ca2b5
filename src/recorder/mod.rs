//! Recording system module
//!
//! - `session`: exclusive ownership of the capture device for one recording
//! - `state`: recording state machine and active-time clock
//! - `coordinator`: the `Studio` driving capture, editing and export

pub mod coordinator;
pub mod session;
pub mod state;

pub use coordinator::{ExportJob, Studio, StudioEvent};
pub use session::{CaptureSession, CapturedMedia};
pub use state::{Phase, RecordingState, SessionClock};
