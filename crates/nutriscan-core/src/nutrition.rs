//! Nutrition facts as returned by the food database, and the finished
//! per-product report.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Nutrient name → value mapping, exactly as the source database sent it.
///
/// Keys follow the database's own naming (`energy-kcal_100g`, `proteins`,
/// `sugars_serving`, ...) and units are whatever the database uses; nothing
/// is converted. Records are owned per request and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutritionRecord(Map<String, Value>);

impl NutritionRecord {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pretty-printed JSON, used for the human-readable details block.
    #[must_use]
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

impl From<Map<String, Value>> for NutritionRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Outcome of scanning one product: the barcode that resolved, the 0–100
/// score, the cleaned explanation, and the raw nutrition record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub barcode: String,
    pub score: u8,
    pub comment: String,
    pub nutrition: NutritionRecord,
}
