//! Nutrition scoring: the scorer seam, the Gemini-backed implementation, and
//! cleanup of the model's free-text explanation.

pub mod error;
pub mod gemini;
pub mod markdown;
pub mod prompt;
pub mod scorer;

pub use error::ScoringError;
pub use gemini::{GeminiScorer, DEFAULT_MODEL};
pub use markdown::clean_markdown;
pub use scorer::{NutritionScore, NutritionScorer};
