//! The live capture loop.
//!
//! A session reads frames, decodes retail symbols, and hands each new
//! barcode to the [`Analyzer`]. The same barcode is not re-analyzed inside
//! the debounce window. A lookup runs inline, so no frame is read while it is
//! in flight, and controls are only observed between frames.
//!
//! In [`SessionMode::AutoStop`] the first successful report ends the
//! session. [`SessionMode::Continuous`] keeps scanning and holds the latest
//! report for the save control. Whichever report ends the session is also
//! written to the handoff path when one is configured.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use image::DynamicImage;
use nutriscan_barcode::{DecodedSymbol, SymbolDecoder};
use nutriscan_core::{normalize, AppConfig, BarcodeLookup, CanonicalBarcode, ScanReport};
use nutriscan_scoring::NutritionScorer;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::analyzer::Analyzer;
use crate::control::{Control, ControlInput, NoControls};
use crate::debounce::{Debounce, DEFAULT_DEBOUNCE};
use crate::error::CaptureError;
use crate::frame::{CaptureDevice, FrameSource};
use crate::handoff;
use crate::preview::{FrameView, NullPreview, Preview, PreviewFrame};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Scanning,
    /// A barcode is being looked up and scored.
    Processing,
    Done,
    Cancelled,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Scanning => "scanning",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionMode {
    /// Stop at the first successful report.
    #[default]
    AutoStop,
    /// Keep scanning until quit, source exhaustion, or timeout.
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    UserQuit,
    TimedOut,
    /// A finite frame source ran out of frames.
    SourceExhausted,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::UserQuit => "cancelled by user",
            Self::TimedOut => "session timed out",
            Self::SourceExhausted => "frame source exhausted",
        };
        f.write_str(label)
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Done(ScanReport),
    /// Ended without an auto-stop result. In continuous mode
    /// `last_report` holds whatever was on screen when the session ended.
    Cancelled {
        reason: CancelReason,
        last_report: Option<ScanReport>,
    },
}

impl SessionOutcome {
    #[must_use]
    pub fn report(&self) -> Option<&ScanReport> {
        match self {
            Self::Done(report) => Some(report),
            Self::Cancelled { last_report, .. } => last_report.as_ref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub mode: SessionMode,
    pub debounce: Duration,
    /// Pause between frames.
    pub poll_interval: Duration,
    /// Where the save control writes snapshots.
    pub output_dir: PathBuf,
    /// The final report is also written here for a waiting launcher: the
    /// auto-stop result, or in continuous mode the report held at the end.
    pub handoff_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: SessionMode::AutoStop,
            debounce: DEFAULT_DEBOUNCE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            output_dir: PathBuf::from("."),
            handoff_path: None,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            poll_interval: Duration::from_millis(config.capture_poll_ms),
            ..Self::default()
        }
    }
}

/// One live capture run over an exclusively owned frame source.
///
/// The device is released exactly once on every exit path: a returned
/// outcome, an error, or the session being dropped by a timeout.
pub struct LiveSession<F: FrameSource, D, L, S> {
    device: CaptureDevice<F>,
    decoder: D,
    analyzer: Analyzer<L, S>,
    controls: Box<dyn ControlInput>,
    preview: Box<dyn Preview>,
    config: SessionConfig,
    status: SessionStatus,
    debounce: Debounce,
    current: Option<ScanReport>,
    last_detected: Option<CanonicalBarcode>,
    message: Option<String>,
}

impl<F, D, L, S> LiveSession<F, D, L, S>
where
    F: FrameSource,
    D: SymbolDecoder,
    L: BarcodeLookup,
    S: NutritionScorer,
{
    pub fn new(source: F, decoder: D, analyzer: Analyzer<L, S>, config: SessionConfig) -> Self {
        Self {
            device: CaptureDevice::new(source),
            decoder,
            analyzer,
            controls: Box::new(NoControls),
            preview: Box::new(NullPreview),
            debounce: Debounce::new(config.debounce),
            config,
            status: SessionStatus::Scanning,
            current: None,
            last_detected: None,
            message: None,
        }
    }

    #[must_use]
    pub fn with_controls(mut self, controls: impl ControlInput + 'static) -> Self {
        self.controls = Box::new(controls);
        self
    }

    #[must_use]
    pub fn with_preview(mut self, preview: impl Preview + 'static) -> Self {
        self.preview = Box::new(preview);
        self
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Runs until a result, a quit, or the frame source running dry.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Io`] if the final report cannot be written to the
    /// handoff path. Frame read failures are logged and skipped.
    pub async fn run(mut self) -> Result<SessionOutcome, CaptureError> {
        let outcome = self.run_loop().await;
        self.device.release();
        outcome
    }

    async fn run_loop(&mut self) -> Result<SessionOutcome, CaptureError> {
        info!(mode = ?self.config.mode, "live session started");
        loop {
            if let Some(control) = self.controls.poll() {
                debug!(?control, "control received");
                match control {
                    Control::Quit => return self.cancel(CancelReason::UserQuit),
                    Control::Clear => self.clear(),
                    Control::Save => self.save(),
                    Control::ForceAnalyze => {
                        if let Some(barcode) = self.last_detected.clone() {
                            if let Some(outcome) = self.process(barcode).await? {
                                return Ok(outcome);
                            }
                        }
                    }
                }
            }

            match self.device.read_frame() {
                Ok(Some(frame)) => {
                    if let Some(outcome) = self.scan_frame(&frame).await? {
                        return Ok(outcome);
                    }
                }
                Ok(None) => return self.cancel(CancelReason::SourceExhausted),
                Err(e) => {
                    warn!(error = %e, "frame read failed");
                    self.render(FrameView::Placeholder, &[]);
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Decodes one frame and processes at most one new barcode from it.
    async fn scan_frame(
        &mut self,
        frame: &DynamicImage,
    ) -> Result<Option<SessionOutcome>, CaptureError> {
        let symbols = self
            .decoder
            .decode(&frame.to_luma8(), self.decoder.supported());
        self.render(FrameView::Image(frame), &symbols);

        let now = Instant::now();
        for symbol in &symbols {
            let Ok(barcode) = normalize(&symbol.payload) else {
                continue;
            };
            self.last_detected = Some(barcode.clone());
            if !self.debounce.should_process(&barcode, now) {
                continue;
            }
            return self.process(barcode).await;
        }
        Ok(None)
    }

    async fn process(
        &mut self,
        barcode: CanonicalBarcode,
    ) -> Result<Option<SessionOutcome>, CaptureError> {
        self.debounce.record(barcode.clone(), Instant::now());
        self.status = SessionStatus::Processing;
        self.message = Some(format!("Analyzing {barcode}..."));
        self.render(FrameView::Placeholder, &[]);

        match self.analyzer.analyze_barcode(&barcode).await {
            Ok(report) => {
                self.message = Some(format!("Score: {}/100", report.score));
                match self.config.mode {
                    SessionMode::AutoStop => {
                        if let Some(path) = &self.config.handoff_path {
                            handoff::write_result(path, &report)?;
                        }
                        self.status = SessionStatus::Done;
                        self.render(FrameView::Placeholder, &[]);
                        info!(barcode = %barcode, score = report.score, "live session done");
                        Ok(Some(SessionOutcome::Done(report)))
                    }
                    SessionMode::Continuous => {
                        self.current = Some(report);
                        self.status = SessionStatus::Scanning;
                        Ok(None)
                    }
                }
            }
            Err(e) => {
                warn!(barcode = %barcode, error = %e, "analysis failed, resuming scan");
                self.message = Some(e.to_string());
                self.status = SessionStatus::Scanning;
                Ok(None)
            }
        }
    }

    fn clear(&mut self) {
        self.current = None;
        self.last_detected = None;
        self.message = None;
        self.debounce.clear();
        info!("results cleared");
    }

    fn save(&mut self) {
        let Some(report) = &self.current else {
            info!("nothing to save");
            return;
        };
        match handoff::save_snapshot(&self.config.output_dir, report, Utc::now()) {
            Ok(path) => self.message = Some(format!("Saved to {}", path.display())),
            Err(e) => warn!(error = %e, "could not save analysis"),
        }
    }

    fn cancel(&mut self, reason: CancelReason) -> Result<SessionOutcome, CaptureError> {
        self.status = SessionStatus::Cancelled;
        self.message = Some(reason.to_string());
        self.render(FrameView::Placeholder, &[]);
        info!(%reason, "live session cancelled");

        let last_report = self.current.take();
        if let (Some(path), Some(report)) = (&self.config.handoff_path, &last_report) {
            handoff::write_result(path, report)?;
        }
        Ok(SessionOutcome::Cancelled {
            reason,
            last_report,
        })
    }

    fn render(&mut self, view: FrameView<'_>, detections: &[DecodedSymbol]) {
        self.preview.render(&PreviewFrame {
            view,
            status: self.status,
            message: self.message.as_deref(),
            detections,
        });
    }
}

/// Runs `session` for at most `timeout`.
///
/// On expiry the in-flight iteration is abandoned, the device is released,
/// and the outcome is [`CancelReason::TimedOut`], distinct from a user quit.
///
/// # Errors
///
/// As [`LiveSession::run`].
pub async fn run_with_timeout<F, D, L, S>(
    mut session: LiveSession<F, D, L, S>,
    timeout: Duration,
) -> Result<SessionOutcome, CaptureError>
where
    F: FrameSource,
    D: SymbolDecoder,
    L: BarcodeLookup,
    S: NutritionScorer,
{
    let result = tokio::time::timeout(timeout, session.run_loop()).await;
    session.device.release();
    match result {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "live session timed out");
            session.cancel(CancelReason::TimedOut)
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
