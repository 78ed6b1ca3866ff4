use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::GrayImage;
use nutriscan_barcode::{BoundingRegion, Symbology};

use super::*;
use crate::analyzer::tests::{sample_record, StubLookup, StubScorer};

const CODE: &str = "5000112637922";

/// What the scripted source yields for one read.
enum Step {
    Frame,
    Broken,
}

struct ScriptedSource {
    steps: VecDeque<Step>,
    endless: bool,
    releases: Arc<AtomicUsize>,
}

impl ScriptedSource {
    fn new(steps: Vec<Step>) -> (Self, Arc<AtomicUsize>) {
        let releases = Arc::new(AtomicUsize::new(0));
        let source = Self {
            steps: steps.into(),
            endless: false,
            releases: Arc::clone(&releases),
        };
        (source, releases)
    }

    fn endless() -> (Self, Arc<AtomicUsize>) {
        let (mut source, releases) = Self::new(Vec::new());
        source.endless = true;
        (source, releases)
    }
}

fn blank_frame() -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::new(8, 8))
}

impl FrameSource for ScriptedSource {
    fn read_frame(&mut self) -> Result<Option<DynamicImage>, CaptureError> {
        match self.steps.pop_front() {
            Some(Step::Frame) => Ok(Some(blank_frame())),
            Some(Step::Broken) => Err(CaptureError::FrameRead("camera hiccup".into())),
            None if self.endless => Ok(Some(blank_frame())),
            None => Ok(None),
        }
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Yields the scripted payloads for successive frames, then nothing.
struct ScriptedDecoder {
    frames: Mutex<VecDeque<Vec<&'static str>>>,
}

impl ScriptedDecoder {
    fn new(frames: Vec<Vec<&'static str>>) -> Self {
        Self {
            frames: Mutex::new(frames.into()),
        }
    }
}

impl SymbolDecoder for ScriptedDecoder {
    fn decode(&self, _image: &GrayImage, _allowed: &[Symbology]) -> Vec<DecodedSymbol> {
        self.frames
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default()
            .into_iter()
            .map(|payload| DecodedSymbol {
                payload: payload.to_string(),
                symbology: Symbology::Ean13,
                region: BoundingRegion {
                    x: 0,
                    y: 0,
                    width: 8,
                    height: 8,
                },
            })
            .collect()
    }
}

struct ScriptedControls(VecDeque<Option<Control>>);

impl ScriptedControls {
    fn new(controls: Vec<Option<Control>>) -> Self {
        Self(controls.into())
    }
}

impl ControlInput for ScriptedControls {
    fn poll(&mut self) -> Option<Control> {
        self.0.pop_front().flatten()
    }
}

struct RecordingPreview(Arc<Mutex<Vec<SessionStatus>>>);

impl Preview for RecordingPreview {
    fn render(&mut self, frame: &PreviewFrame<'_>) {
        self.0.lock().unwrap().push(frame.status);
    }
}

fn config(poll_secs: u64) -> SessionConfig {
    SessionConfig {
        poll_interval: Duration::from_secs(poll_secs),
        ..SessionConfig::default()
    }
}

type TestSession = LiveSession<ScriptedSource, ScriptedDecoder, Arc<StubLookup>, StubScorer>;

fn session(
    source: ScriptedSource,
    frames: Vec<Vec<&'static str>>,
    lookup: &Arc<StubLookup>,
    config: SessionConfig,
) -> TestSession {
    LiveSession::new(
        source,
        ScriptedDecoder::new(frames),
        Analyzer::new(Arc::clone(lookup), StubScorer::new(78, "**Good** snack")),
        config,
    )
}

#[tokio::test(start_paused = true)]
async fn repeat_detection_inside_window_is_looked_up_once() {
    let (source, _) = ScriptedSource::new(vec![Step::Frame, Step::Frame]);
    let lookup = Arc::new(StubLookup::new(&[]));

    let outcome = session(source, vec![vec![CODE], vec![CODE]], &lookup, config(1))
        .run()
        .await
        .unwrap();

    assert_eq!(lookup.calls(), [CODE]);
    assert!(matches!(
        outcome,
        SessionOutcome::Cancelled {
            reason: CancelReason::SourceExhausted,
            last_report: None
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn repeat_detection_after_window_is_looked_up_again() {
    let (source, _) = ScriptedSource::new(vec![Step::Frame, Step::Frame]);
    let lookup = Arc::new(StubLookup::new(&[]));

    session(source, vec![vec![CODE], vec![CODE]], &lookup, config(4))
        .run()
        .await
        .unwrap();

    assert_eq!(lookup.calls(), [CODE, CODE]);
}

#[tokio::test(start_paused = true)]
async fn auto_stop_ends_on_first_result_and_writes_handoff() {
    let dir = tempfile::tempdir().unwrap();
    let handoff_path = dir.path().join("result.json");
    let (source, releases) = ScriptedSource::new(vec![Step::Frame, Step::Frame, Step::Frame]);
    let lookup = Arc::new(StubLookup::new(&[CODE]));
    let statuses = Arc::new(Mutex::new(Vec::new()));

    let outcome = session(
        source,
        vec![vec![CODE], vec![CODE], vec![CODE]],
        &lookup,
        SessionConfig {
            handoff_path: Some(handoff_path.clone()),
            ..config(0)
        },
    )
    .with_preview(RecordingPreview(Arc::clone(&statuses)))
    .run()
    .await
    .unwrap();

    let report = match outcome {
        SessionOutcome::Done(report) => report,
        other => panic!("expected a result, got {other:?}"),
    };
    assert_eq!(report.barcode, CODE);
    assert_eq!(report.score, 78);
    assert_eq!(report.comment, "Good snack");
    assert_eq!(report.nutrition, sample_record());
    assert_eq!(lookup.calls().len(), 1);
    assert_eq!(releases.load(Ordering::SeqCst), 1);

    let statuses = statuses.lock().unwrap();
    assert!(statuses.contains(&SessionStatus::Processing));
    assert_eq!(statuses.last(), Some(&SessionStatus::Done));

    assert_eq!(handoff::take_result(&handoff_path).unwrap(), Some(report));
}

#[tokio::test(start_paused = true)]
async fn failed_lookup_returns_to_scanning() {
    let (source, _) = ScriptedSource::new(vec![Step::Frame, Step::Frame]);
    let lookup = Arc::new(StubLookup::new(&["96385074"]));

    let outcome = session(
        source,
        vec![vec![CODE], vec!["96385074"]],
        &lookup,
        config(0),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(lookup.calls(), [CODE, "96385074"]);
    assert_eq!(outcome.report().map(|r| r.barcode.as_str()), Some("96385074"));
}

#[tokio::test(start_paused = true)]
async fn quit_cancels_without_result() {
    let (source, releases) = ScriptedSource::endless();
    let lookup = Arc::new(StubLookup::new(&[CODE]));

    let outcome = session(source, Vec::new(), &lookup, config(0))
        .with_controls(ScriptedControls::new(vec![None, None, Some(Control::Quit)]))
        .run()
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Cancelled {
            reason: CancelReason::UserQuit,
            last_report: None
        }
    );
    assert!(lookup.calls().is_empty());
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn timeout_is_distinct_from_quit_and_releases_once() {
    let (source, releases) = ScriptedSource::endless();
    let lookup = Arc::new(StubLookup::new(&[]));
    let live = session(source, Vec::new(), &lookup, config(1));

    let outcome = run_with_timeout(live, Duration::from_secs(5)).await.unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Cancelled {
            reason: CancelReason::TimedOut,
            last_report: None
        }
    );
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn frame_read_failure_is_not_fatal() {
    let (source, _) = ScriptedSource::new(vec![Step::Broken, Step::Frame]);
    let lookup = Arc::new(StubLookup::new(&[CODE]));

    let outcome = session(source, vec![vec![CODE]], &lookup, config(0))
        .run()
        .await
        .unwrap();

    assert!(matches!(outcome, SessionOutcome::Done(_)));
}

#[tokio::test(start_paused = true)]
async fn force_analyze_bypasses_debounce() {
    let (source, _) = ScriptedSource::new(vec![Step::Frame, Step::Frame]);
    let lookup = Arc::new(StubLookup::new(&[]));

    session(source, vec![vec![CODE]], &lookup, config(0))
        .with_controls(ScriptedControls::new(vec![
            None,
            Some(Control::ForceAnalyze),
        ]))
        .run()
        .await
        .unwrap();

    assert_eq!(lookup.calls(), [CODE, CODE]);
}

#[tokio::test(start_paused = true)]
async fn continuous_mode_saves_and_clears() {
    let dir = tempfile::tempdir().unwrap();
    let (source, _) = ScriptedSource::new(vec![Step::Frame, Step::Frame, Step::Frame]);
    let lookup = Arc::new(StubLookup::new(&[CODE]));

    let outcome = session(
        source,
        vec![vec![CODE], vec![CODE], vec![CODE]],
        &lookup,
        SessionConfig {
            mode: SessionMode::Continuous,
            output_dir: dir.path().to_path_buf(),
            ..config(1)
        },
    )
    .with_controls(ScriptedControls::new(vec![
        None,
        Some(Control::Save),
        Some(Control::Clear),
    ]))
    .run()
    .await
    .unwrap();

    // Frame two is debounced; clearing before frame three lets the same
    // code through again.
    assert_eq!(lookup.calls(), [CODE, CODE]);

    let saved: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].starts_with("nutrition_analysis_"));

    let report = match outcome {
        SessionOutcome::Cancelled {
            reason: CancelReason::SourceExhausted,
            last_report: Some(report),
        } => report,
        other => panic!("expected exhausted session with a report, got {other:?}"),
    };
    assert_eq!(report.barcode, CODE);
}

#[tokio::test(start_paused = true)]
async fn continuous_mode_hands_off_last_report_when_timed_out() {
    let dir = tempfile::tempdir().unwrap();
    let handoff_path = dir.path().join("result.json");
    let (source, _) = ScriptedSource::endless();
    let lookup = Arc::new(StubLookup::new(&[CODE]));
    let live = session(
        source,
        vec![vec![CODE]],
        &lookup,
        SessionConfig {
            mode: SessionMode::Continuous,
            handoff_path: Some(handoff_path.clone()),
            ..config(1)
        },
    );

    let outcome = run_with_timeout(live, Duration::from_secs(5)).await.unwrap();

    let report = match outcome {
        SessionOutcome::Cancelled {
            reason: CancelReason::TimedOut,
            last_report: Some(report),
        } => report,
        other => panic!("expected timed-out session with a report, got {other:?}"),
    };
    assert_eq!(report.barcode, CODE);
    assert_eq!(handoff::take_result(&handoff_path).unwrap(), Some(report));
}

#[tokio::test(start_paused = true)]
async fn continuous_mode_without_report_leaves_no_handoff() {
    let dir = tempfile::tempdir().unwrap();
    let handoff_path = dir.path().join("result.json");
    let (source, _) = ScriptedSource::new(vec![Step::Frame, Step::Frame]);
    let lookup = Arc::new(StubLookup::new(&[]));

    let outcome = session(
        source,
        vec![vec![CODE]],
        &lookup,
        SessionConfig {
            mode: SessionMode::Continuous,
            handoff_path: Some(handoff_path.clone()),
            ..config(0)
        },
    )
    .run()
    .await
    .unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Cancelled {
            reason: CancelReason::SourceExhausted,
            last_report: None
        }
    );
    assert!(!handoff_path.exists());
}

#[test]
fn config_follows_app_settings() {
    let app = AppConfig {
        google_api_key: "k".into(),
        log_level: "info".into(),
        user_agent: "ua".into(),
        foodfacts_base_url: "http://localhost".into(),
        foodfacts_timeout_secs: 10,
        scorer_base_url: "http://localhost".into(),
        scorer_model: "m".into(),
        scorer_timeout_secs: 60,
        upscale_min_dimension: 1000,
        debounce_ms: 1500,
        capture_poll_ms: 25,
        session_timeout_secs: 120,
    };
    let config = SessionConfig::from_app_config(&app);
    assert_eq!(config.debounce, Duration::from_millis(1500));
    assert_eq!(config.poll_interval, Duration::from_millis(25));
    assert_eq!(config.mode, SessionMode::AutoStop);
    assert!(config.handoff_path.is_none());
}
