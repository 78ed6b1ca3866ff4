//! The food-database collaborator seam.

use async_trait::async_trait;

use crate::barcode::CanonicalBarcode;
use crate::nutrition::NutritionRecord;

/// Result of resolving one barcode against the food database.
///
/// "Not in the database" is an expected outcome and is kept apart from
/// transport or payload failures, whose reason string is carried verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(NutritionRecord),
    NotFound,
    Error(String),
}

/// Resolves a canonical barcode to nutrition facts.
///
/// Implementations make exactly one attempt per call. Retrying with
/// alternative candidates is the caller's job.
#[async_trait]
pub trait BarcodeLookup: Send + Sync {
    async fn lookup(&self, barcode: &CanonicalBarcode) -> LookupOutcome;
}

#[async_trait]
impl<T: BarcodeLookup + ?Sized> BarcodeLookup for &T {
    async fn lookup(&self, barcode: &CanonicalBarcode) -> LookupOutcome {
        (**self).lookup(barcode).await
    }
}

#[async_trait]
impl<T: BarcodeLookup + ?Sized> BarcodeLookup for std::sync::Arc<T> {
    async fn lookup(&self, barcode: &CanonicalBarcode) -> LookupOutcome {
        (**self).lookup(barcode).await
    }
}
