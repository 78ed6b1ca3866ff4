//! Result files exchanged with the process that launched a capture session.
//!
//! An auto-stop session writes its report to a handoff path; the launcher
//! picks it up with [`take_result`], which deletes the file so a stale result
//! is never read twice. Saved snapshots from continuous mode use the same
//! fields plus a timestamp.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use nutriscan_core::{NutritionRecord, ScanReport};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CaptureError;

/// On-disk shape of a handoff file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoffRecord {
    pub barcode: String,
    pub score: u8,
    pub comment: String,
    pub nutrition_data: NutritionRecord,
    /// `nutrition_data` pretty-printed, for display without re-serializing.
    pub details: String,
}

impl From<&ScanReport> for HandoffRecord {
    fn from(report: &ScanReport) -> Self {
        Self {
            barcode: report.barcode.clone(),
            score: report.score,
            comment: report.comment.clone(),
            nutrition_data: report.nutrition.clone(),
            details: report.nutrition.to_pretty_json(),
        }
    }
}

impl From<HandoffRecord> for ScanReport {
    fn from(record: HandoffRecord) -> Self {
        Self {
            barcode: record.barcode,
            score: record.score,
            comment: record.comment,
            nutrition: record.nutrition_data,
        }
    }
}

/// A continuous-mode snapshot written by the save control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedAnalysis {
    pub barcode: String,
    pub score: u8,
    pub comment: String,
    pub nutrition_data: NutritionRecord,
    pub saved_at: DateTime<Utc>,
}

/// Writes `report` to `path` as pretty JSON, replacing any previous file.
///
/// # Errors
///
/// [`CaptureError::Io`] if the file cannot be written.
pub fn write_result(path: &Path, report: &ScanReport) -> Result<(), CaptureError> {
    write_json(path, &HandoffRecord::from(report))?;
    info!(path = %path.display(), barcode = %report.barcode, "handoff result written");
    Ok(())
}

/// Reads and deletes the handoff file at `path`.
///
/// Returns `Ok(None)` if no session has written a result.
///
/// # Errors
///
/// - [`CaptureError::Io`] if the file exists but cannot be read or removed.
/// - [`CaptureError::Json`] if it is not a handoff record.
pub fn take_result(path: &Path) -> Result<Option<ScanReport>, CaptureError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CaptureError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    fs::remove_file(path).map_err(|source| CaptureError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let record: HandoffRecord =
        serde_json::from_str(&contents).map_err(|source| CaptureError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(record.into()))
}

/// Saves `report` under `dir` as `nutrition_analysis_<unix seconds>.json`
/// and returns the path written.
///
/// # Errors
///
/// [`CaptureError::Io`] if the file cannot be written.
pub fn save_snapshot(
    dir: &Path,
    report: &ScanReport,
    now: DateTime<Utc>,
) -> Result<PathBuf, CaptureError> {
    let path = dir.join(format!("nutrition_analysis_{}.json", now.timestamp()));
    let snapshot = SavedAnalysis {
        barcode: report.barcode.clone(),
        score: report.score,
        comment: report.comment.clone(),
        nutrition_data: report.nutrition.clone(),
        saved_at: now,
    };
    write_json(&path, &snapshot)?;
    info!(path = %path.display(), "analysis saved");
    Ok(path)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CaptureError> {
    let io_err = |source: std::io::Error| CaptureError::Io {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_string_pretty(value).map_err(|e| io_err(e.into()))?;
    fs::write(path, json).map_err(io_err)
}
