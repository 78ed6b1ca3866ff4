//! `OpenFoodFacts` product lookup.

pub mod client;
pub mod error;
pub mod types;

pub use client::{FoodFactsClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::FoodFactsError;
pub use types::{Product, ProductResponse};
