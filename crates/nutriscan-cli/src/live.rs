//! Live capture and handoff retrieval.

use std::io::{BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Duration;

use nutriscan_barcode::ScanlineDecoder;
use nutriscan_capture::{
    handoff, run_with_timeout, ChannelControls, Control, ImageSequenceSource, LiveSession,
    SessionConfig, SessionMode, SessionOutcome, TracingPreview,
};
use nutriscan_core::AppConfig;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::scan::{build_analyzer, print_report};

#[derive(Debug)]
pub(crate) struct LiveOptions {
    pub frames: PathBuf,
    pub timeout_secs: Option<u64>,
    pub continuous: bool,
    pub handoff: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl LiveOptions {
    fn session_config(&self, config: &AppConfig) -> SessionConfig {
        SessionConfig {
            mode: if self.continuous {
                SessionMode::Continuous
            } else {
                SessionMode::AutoStop
            },
            output_dir: self.output_dir.clone(),
            handoff_path: self.handoff.clone(),
            ..SessionConfig::from_app_config(config)
        }
    }

    fn timeout(&self, config: &AppConfig) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(config.session_timeout_secs))
    }
}

/// Run a live session over a frame directory until it produces a result,
/// the user quits, the frames run out, or the time limit expires.
///
/// When stdin is a terminal, each line typed is read as keys: `q` quits,
/// `c` clears, `s` saves, and an empty line forces analysis of the last
/// detected barcode.
///
/// # Errors
///
/// Returns an error if the frame directory cannot be opened, the clients
/// cannot be built, or the handoff file cannot be written.
pub(crate) async fn run_live(config: &AppConfig, options: LiveOptions) -> anyhow::Result<()> {
    let source = ImageSequenceSource::open(&options.frames)?;
    let analyzer = build_analyzer(config)?;

    let mut session = LiveSession::new(
        source,
        ScanlineDecoder::new(),
        analyzer,
        options.session_config(config),
    )
    .with_preview(TracingPreview::default());

    if std::io::stdin().is_terminal() {
        let (tx, rx) = mpsc::unbounded_channel();
        spawn_key_reader(tx);
        session = session.with_controls(ChannelControls::new(rx));
    } else {
        tracing::debug!("stdin is not a terminal; running without key controls");
    }

    match run_with_timeout(session, options.timeout(config)).await? {
        SessionOutcome::Done(report) => print_report(&report),
        SessionOutcome::Cancelled {
            reason,
            last_report,
        } => {
            println!("session ended: {reason}");
            if let Some(report) = last_report {
                println!();
                print_report(&report);
            }
        }
    }
    Ok(())
}

/// Print and delete the result a session left at `path`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed or removed.
pub(crate) fn run_handoff(path: &Path) -> anyhow::Result<()> {
    match handoff::take_result(path)? {
        Some(report) => print_report(&report),
        None => println!("no result waiting at {}", path.display()),
    }
    Ok(())
}

/// Forwards typed keys to the session. Runs on a plain thread so a pending
/// stdin read never holds up runtime shutdown.
fn spawn_key_reader(tx: UnboundedSender<Control>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let controls: Vec<Control> = if line.trim().is_empty() {
                vec![Control::ForceAnalyze]
            } else {
                line.chars().filter_map(Control::from_key).collect()
            };
            for control in controls {
                if tx.send(control).is_err() {
                    return;
                }
            }
        }
    });
}
