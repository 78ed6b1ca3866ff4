use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The file or byte buffer could not be decoded as an image.
    #[error("error opening image: {0}")]
    ImageOpen(String),

    /// Every rotation and every decoded candidate was tried without a
    /// successful lookup.
    #[error("no barcode found in image ({candidates_tried} candidate lookups failed)")]
    NoBarcodeFound {
        candidates_tried: usize,
        last_error: Option<String>,
    },
}
