//! Shared domain types, barcode normalization, and configuration for nutriscan.

mod app_config;
pub mod barcode;
mod config;
pub mod lookup;
pub mod nutrition;

use thiserror::Error;

pub use app_config::AppConfig;
pub use barcode::{normalize, CanonicalBarcode};
pub use config::{load_app_config, load_app_config_from_env};
pub use lookup::{BarcodeLookup, LookupOutcome};
pub use nutrition::{NutritionRecord, ScanReport};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Errors produced while turning raw decoder output into a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarcodeError {
    #[error("invalid barcode {input:?}: no digits found")]
    InvalidBarcode { input: String },
}
