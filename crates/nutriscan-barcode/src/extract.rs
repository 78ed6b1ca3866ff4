//! Photo to product resolution.
//!
//! A photo is tried at every quarter-turn rotation. Each decoded symbol
//! expands into one or more lookup candidates depending on its symbology,
//! and the first candidate the database recognises wins.

use std::collections::HashSet;
use std::path::Path;

use image::DynamicImage;
use nutriscan_core::{normalize, BarcodeLookup, CanonicalBarcode, LookupOutcome, NutritionRecord};
use tracing::{debug, info, warn};

use crate::decode::{DecodedSymbol, ScanlineDecoder, SymbolDecoder};
use crate::error::ExtractionError;
use crate::preprocess::{prepare, Rotation};
use crate::symbology::Symbology;

/// Images whose shorter side is below this many pixels are upscaled 2x
/// before decoding.
pub const DEFAULT_UPSCALE_MIN_DIMENSION: u32 = 1000;

/// Digit strings at least this long are also looked up verbatim, whatever
/// their symbology.
const GENERIC_MIN_DIGITS: usize = 8;

/// A product resolved from a photo.
#[derive(Debug, Clone)]
pub struct ResolvedProduct {
    /// The canonical code the database matched.
    pub barcode: CanonicalBarcode,
    pub symbology: Symbology,
    pub rotation: Rotation,
    pub record: NutritionRecord,
}

/// File extensions accepted for uploaded or replayed images.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Whether `path` has one of [`SUPPORTED_EXTENSIONS`] (case-insensitive).
#[must_use]
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Opens an image file in any enabled raster format.
///
/// # Errors
///
/// Returns [`ExtractionError::ImageOpen`] if the file is unreadable or not a
/// supported image.
pub fn open_image(path: &Path) -> Result<DynamicImage, ExtractionError> {
    image::open(path).map_err(|e| ExtractionError::ImageOpen(format!("{}: {e}", path.display())))
}

/// Decodes an in-memory image (an upload body, for example).
///
/// # Errors
///
/// Returns [`ExtractionError::ImageOpen`] if the bytes are not a supported
/// image.
pub fn load_image(bytes: &[u8]) -> Result<DynamicImage, ExtractionError> {
    image::load_from_memory(bytes).map_err(|e| ExtractionError::ImageOpen(e.to_string()))
}

/// Lookup candidates for one decoded symbol, in the order they should be
/// tried.
///
/// EAN-13, EAN-8 and UPC-E payloads of the expected length are tried as-is.
/// A 12-digit UPC-A is tried as-is and then with a leading zero (its EAN-13
/// form). Any digit string of 8 or more digits is finally tried verbatim as a
/// generic fallback. Duplicates are dropped.
#[must_use]
pub fn candidate_codes(symbology: Symbology, digits: &str) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::with_capacity(3);
    match (symbology, digits.len()) {
        (Symbology::Ean13, 13) | (Symbology::Ean8, 8) => candidates.push(digits.to_string()),
        (Symbology::UpcA, 12) => {
            candidates.push(digits.to_string());
            candidates.push(format!("0{digits}"));
        }
        (Symbology::UpcE, n) if n >= 6 => candidates.push(digits.to_string()),
        _ => {}
    }

    if digits.len() >= GENERIC_MIN_DIGITS && !candidates.iter().any(|c| c == digits) {
        candidates.push(digits.to_string());
    }
    candidates
}

/// Finds barcodes in photos and resolves them against a product database.
#[derive(Debug, Clone)]
pub struct BarcodeExtractor<D = ScanlineDecoder> {
    decoder: D,
    upscale_min_dimension: u32,
}

impl BarcodeExtractor<ScanlineDecoder> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_decoder(ScanlineDecoder::new())
    }
}

impl Default for BarcodeExtractor<ScanlineDecoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: SymbolDecoder> BarcodeExtractor<D> {
    pub fn with_decoder(decoder: D) -> Self {
        Self {
            decoder,
            upscale_min_dimension: DEFAULT_UPSCALE_MIN_DIMENSION,
        }
    }

    #[must_use]
    pub fn with_upscale_min_dimension(mut self, pixels: u32) -> Self {
        self.upscale_min_dimension = pixels;
        self
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Decodes every rotation of `image` without looking anything up.
    pub fn scan(&self, image: &DynamicImage) -> Vec<(Rotation, DecodedSymbol)> {
        Rotation::ALL
            .into_iter()
            .flat_map(|rotation| {
                self.decode_rotation(image, rotation)
                    .into_iter()
                    .map(move |symbol| (rotation, symbol))
            })
            .collect()
    }

    /// Resolves the first barcode in `image` that `lookup` recognises.
    ///
    /// Rotations are tried in order 0, 90, 180 and 270 degrees, and within a
    /// rotation symbols are tried in scan order. The search stops at the
    /// first [`LookupOutcome::Found`]. A code the database reported as
    /// [`LookupOutcome::NotFound`] is not looked up again at later
    /// rotations; a code whose lookup failed with an error is, so the
    /// rotation passes double as retries.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::NoBarcodeFound`] once every rotation and
    /// every candidate has been tried without a match. The last lookup error
    /// seen, if any, is carried along for diagnostics.
    pub async fn extract_and_resolve<L>(
        &self,
        image: &DynamicImage,
        lookup: &L,
    ) -> Result<ResolvedProduct, ExtractionError>
    where
        L: BarcodeLookup + ?Sized,
    {
        let mut not_found: HashSet<CanonicalBarcode> = HashSet::new();
        let mut candidates_tried = 0usize;
        let mut last_error: Option<String> = None;

        for rotation in Rotation::ALL {
            let symbols = self.decode_rotation(image, rotation);
            debug!(
                rotation = rotation.degrees(),
                symbols = symbols.len(),
                "decoded rotation"
            );

            for symbol in symbols {
                for candidate in candidate_codes(symbol.symbology, &symbol.digits()) {
                    let Ok(barcode) = normalize(&candidate) else {
                        continue;
                    };
                    if not_found.contains(&barcode) {
                        continue;
                    }

                    candidates_tried += 1;
                    match lookup.lookup(&barcode).await {
                        LookupOutcome::Found(record) => {
                            info!(
                                barcode = %barcode,
                                symbology = %symbol.symbology,
                                rotation = rotation.degrees(),
                                "barcode resolved"
                            );
                            return Ok(ResolvedProduct {
                                barcode,
                                symbology: symbol.symbology,
                                rotation,
                                record,
                            });
                        }
                        LookupOutcome::NotFound => {
                            debug!(barcode = %barcode, "candidate not in database");
                            not_found.insert(barcode);
                        }
                        LookupOutcome::Error(reason) => {
                            warn!(barcode = %barcode, reason = %reason, "candidate lookup failed");
                            last_error = Some(reason);
                        }
                    }
                }
            }
        }

        Err(ExtractionError::NoBarcodeFound {
            candidates_tried,
            last_error,
        })
    }

    /// Opens `path` and resolves it with [`Self::extract_and_resolve`].
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::ImageOpen`] for unreadable files, otherwise
    /// as [`Self::extract_and_resolve`].
    pub async fn extract_from_path<L>(
        &self,
        path: &Path,
        lookup: &L,
    ) -> Result<ResolvedProduct, ExtractionError>
    where
        L: BarcodeLookup + ?Sized,
    {
        let image = open_image(path)?;
        self.extract_and_resolve(&image, lookup).await
    }

    fn decode_rotation(&self, image: &DynamicImage, rotation: Rotation) -> Vec<DecodedSymbol> {
        let frame = prepare(image, rotation, self.upscale_min_dimension);
        self.decoder.decode(&frame, &Symbology::RETAIL)
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
