//! Barcode detection for product photos and camera frames.
//!
//! [`extract::BarcodeExtractor`] drives a photo through rotation and contrast
//! preprocessing, decodes retail symbols with a [`decode::SymbolDecoder`], and
//! resolves the resulting candidates against a
//! [`nutriscan_core::BarcodeLookup`] until one of them is found.

pub mod decode;
pub mod error;
pub mod extract;
pub mod preprocess;
pub mod symbology;

#[cfg(test)]
pub(crate) mod test_support;

pub use decode::{BoundingRegion, DecodedSymbol, ScanlineDecoder, SymbolDecoder};
pub use error::ExtractionError;
pub use extract::{
    candidate_codes, has_supported_extension, load_image, open_image, BarcodeExtractor,
    ResolvedProduct, DEFAULT_UPSCALE_MIN_DIMENSION, SUPPORTED_EXTENSIONS,
};
pub use preprocess::Rotation;
pub use symbology::Symbology;
