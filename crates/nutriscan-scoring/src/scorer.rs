use async_trait::async_trait;
use nutriscan_core::NutritionRecord;
use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

/// A 0–100 score with its explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionScore {
    pub score: u8,
    pub comment: String,
}

/// Scores a nutrition record.
///
/// Treated as an opaque and possibly slow collaborator: callers only rely on
/// the record → (score, comment) contract.
#[async_trait]
pub trait NutritionScorer: Send + Sync {
    async fn score(&self, record: &NutritionRecord) -> Result<NutritionScore, ScoringError>;
}

#[async_trait]
impl<T: NutritionScorer + ?Sized> NutritionScorer for &T {
    async fn score(&self, record: &NutritionRecord) -> Result<NutritionScore, ScoringError> {
        (**self).score(record).await
    }
}

#[async_trait]
impl<T: NutritionScorer + ?Sized> NutritionScorer for std::sync::Arc<T> {
    async fn score(&self, record: &NutritionRecord) -> Result<NutritionScore, ScoringError> {
        (**self).score(record).await
    }
}
