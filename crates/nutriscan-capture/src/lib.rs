//! Live barcode capture and per-barcode analysis.
//!
//! [`analyzer::Analyzer`] turns one barcode into a scored report.
//! [`session::LiveSession`] drives a frame source through decode, debounce
//! and analysis until it has a result, the user quits, or the caller's
//! timeout expires.

pub mod analyzer;
pub mod control;
pub mod debounce;
pub mod error;
pub mod frame;
pub mod handoff;
pub mod preview;
pub mod session;

pub use analyzer::Analyzer;
pub use control::{ChannelControls, Control, ControlInput, NoControls};
pub use debounce::Debounce;
pub use error::{AnalysisError, CaptureError};
pub use frame::{CaptureDevice, FrameSource, ImageSequenceSource};
pub use preview::{FrameView, NullPreview, Preview, PreviewFrame, TracingPreview};
pub use session::{
    run_with_timeout, CancelReason, LiveSession, SessionConfig, SessionMode, SessionOutcome,
    SessionStatus,
};
