use thiserror::Error;

/// Errors building a [`crate::FoodFactsClient`].
///
/// Lookups themselves never fail with this type: every per-barcode failure
/// is reported as a [`nutriscan_core::LookupOutcome`].
#[derive(Debug, Error)]
pub enum FoodFactsError {
    /// The underlying `reqwest::Client` could not be constructed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
