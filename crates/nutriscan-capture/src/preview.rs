//! Operator feedback for the live session.
//!
//! The session describes what it would draw (the frame, a status line, a
//! message, and the detected symbols) and a [`Preview`] decides how to show
//! it. Frames that failed to read are shown as a placeholder so the view
//! never freezes.

use image::DynamicImage;
use nutriscan_barcode::DecodedSymbol;
use tracing::info;

use crate::session::SessionStatus;

/// What to show in the frame area.
#[derive(Debug, Clone, Copy)]
pub enum FrameView<'a> {
    Image(&'a DynamicImage),
    /// The frame could not be read.
    Placeholder,
}

/// One rendered update.
#[derive(Debug, Clone, Copy)]
pub struct PreviewFrame<'a> {
    pub view: FrameView<'a>,
    pub status: SessionStatus,
    /// Result summary or last error, if any.
    pub message: Option<&'a str>,
    pub detections: &'a [DecodedSymbol],
}

pub trait Preview: Send {
    fn render(&mut self, frame: &PreviewFrame<'_>);
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPreview;

impl Preview for NullPreview {
    fn render(&mut self, _frame: &PreviewFrame<'_>) {}
}

/// Logs status and message changes instead of drawing.
#[derive(Debug, Default)]
pub struct TracingPreview {
    last_status: Option<SessionStatus>,
    last_message: Option<String>,
}

impl Preview for TracingPreview {
    fn render(&mut self, frame: &PreviewFrame<'_>) {
        let message_changed = frame.message != self.last_message.as_deref();
        if self.last_status == Some(frame.status) && !message_changed {
            return;
        }
        info!(
            status = %frame.status,
            message = frame.message.unwrap_or(""),
            detections = frame.detections.len(),
            placeholder = matches!(frame.view, FrameView::Placeholder),
            "preview"
        );
        self.last_status = Some(frame.status);
        self.last_message = frame.message.map(str::to_owned);
    }
}
