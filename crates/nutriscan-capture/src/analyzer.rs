//! One barcode in, one scored report out.

use nutriscan_core::{
    normalize, BarcodeLookup, CanonicalBarcode, LookupOutcome, NutritionRecord, ScanReport,
};
use nutriscan_scoring::{clean_markdown, NutritionScorer};
use tracing::{info, warn};

use crate::error::AnalysisError;

/// Normalizes, looks up and scores barcodes.
///
/// Shared by manual entry, the photo flow (through [`Analyzer::score_record`]
/// once the extractor has resolved a record) and the live session.
pub struct Analyzer<L, S> {
    lookup: L,
    scorer: S,
}

impl<L: BarcodeLookup, S: NutritionScorer> Analyzer<L, S> {
    pub fn new(lookup: L, scorer: S) -> Self {
        Self { lookup, scorer }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Analyzes a raw, possibly formatted, barcode string.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::InvalidBarcode`] if `raw` has no digits, otherwise as
    /// [`Analyzer::analyze_barcode`].
    pub async fn analyze(&self, raw: &str) -> Result<ScanReport, AnalysisError> {
        let barcode = normalize(raw)?;
        self.analyze_barcode(&barcode).await
    }

    /// Looks up and scores an already normalized barcode.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::NotFound`] if the database has no such product.
    /// - [`AnalysisError::Lookup`] if the lookup failed.
    /// - [`AnalysisError::Scoring`] if the scorer failed.
    pub async fn analyze_barcode(
        &self,
        barcode: &CanonicalBarcode,
    ) -> Result<ScanReport, AnalysisError> {
        match self.lookup.lookup(barcode).await {
            LookupOutcome::Found(record) => self.score_record(barcode, record).await,
            LookupOutcome::NotFound => Err(AnalysisError::NotFound {
                barcode: barcode.to_string(),
            }),
            LookupOutcome::Error(reason) => {
                warn!(barcode = %barcode, reason = %reason, "lookup failed");
                Err(AnalysisError::Lookup {
                    barcode: barcode.to_string(),
                    reason,
                })
            }
        }
    }

    /// Scores a record that has already been resolved and assembles the
    /// report, with Markdown stripped from the explanation.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::Scoring`] if the scorer failed.
    pub async fn score_record(
        &self,
        barcode: &CanonicalBarcode,
        record: NutritionRecord,
    ) -> Result<ScanReport, AnalysisError> {
        let score = self.scorer.score(&record).await?;
        info!(barcode = %barcode, score = score.score, "analysis complete");
        Ok(ScanReport {
            barcode: barcode.to_string(),
            score: score.score,
            comment: clean_markdown(&score.comment),
            nutrition: record,
        })
    }
}
