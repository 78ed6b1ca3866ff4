use std::path::PathBuf;

use nutriscan_core::BarcodeError;
use nutriscan_scoring::ScoringError;
use thiserror::Error;

/// Why one barcode could not be turned into a report.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    InvalidBarcode(#[from] BarcodeError),

    #[error("product not found for barcode {barcode}")]
    NotFound { barcode: String },

    #[error("lookup failed for barcode {barcode}: {reason}")]
    Lookup { barcode: String, reason: String },

    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),
}

/// Errors from frame sources and result files.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// A single frame could not be read. Non-fatal inside a session.
    #[error("frame read failed: {0}")]
    FrameRead(String),

    #[error("cannot open frame source {path}: {source}")]
    OpenSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid result file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
