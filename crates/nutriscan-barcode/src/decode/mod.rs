//! Symbol decoding seam.
//!
//! Everything downstream of decoding only needs `(payload, symbology,
//! region)` triples, so the engine sits behind [`SymbolDecoder`] and can be
//! swapped without touching the extractor or the live capture loop.

pub(crate) mod patterns;
mod scanline;

use image::GrayImage;
use serde::Serialize;

use crate::symbology::Symbology;

pub use scanline::ScanlineDecoder;

/// Axis-aligned pixel rectangle a symbol was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingRegion {
    /// Smallest region covering both `self` and `other`.
    #[must_use]
    pub fn union(self, other: BoundingRegion) -> BoundingRegion {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = (self.x + self.width).max(other.x + other.width);
        let y1 = (self.y + self.height).max(other.y + other.height);
        BoundingRegion {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}

/// One symbol read from an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedSymbol {
    /// Payload text as the engine produced it.
    pub payload: String,
    pub symbology: Symbology,
    pub region: BoundingRegion,
}

impl DecodedSymbol {
    /// The payload with every non-digit character removed.
    #[must_use]
    pub fn digits(&self) -> String {
        self.payload.chars().filter(char::is_ascii_digit).collect()
    }
}

/// A barcode decoding engine.
pub trait SymbolDecoder: Send + Sync {
    /// Decodes every symbol of an `allowed` symbology found in `image`, in
    /// scan order (top to bottom).
    fn decode(&self, image: &GrayImage, allowed: &[Symbology]) -> Vec<DecodedSymbol>;

    /// Every symbology this engine can read.
    fn supported(&self) -> &[Symbology] {
        &Symbology::RETAIL
    }
}

impl<T: SymbolDecoder + ?Sized> SymbolDecoder for &T {
    fn decode(&self, image: &GrayImage, allowed: &[Symbology]) -> Vec<DecodedSymbol> {
        (**self).decode(image, allowed)
    }

    fn supported(&self) -> &[Symbology] {
        (**self).supported()
    }
}
