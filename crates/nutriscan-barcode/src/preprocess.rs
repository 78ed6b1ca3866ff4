//! Rotation, grayscale, contrast and upscaling applied before decoding.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use serde::Serialize;
use tracing::debug;

/// Quarter-turn orientations tried for each photo, counterclockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Every orientation in the order they are tried.
    pub const ALL: [Rotation; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    #[must_use]
    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Rotates `image` counterclockwise by this angle. Width and height swap
    /// for the quarter turns.
    #[must_use]
    pub fn apply(self, image: &DynamicImage) -> DynamicImage {
        match self {
            Self::Deg0 => image.clone(),
            Self::Deg90 => image.rotate270(),
            Self::Deg180 => image.rotate180(),
            Self::Deg270 => image.rotate90(),
        }
    }
}

/// Stretches the intensity range of `image` so its darkest pixel maps to 0
/// and its lightest to 255. Flat images are returned unchanged.
#[must_use]
pub fn autocontrast(image: &GrayImage) -> GrayImage {
    let mut histogram = [0u32; 256];
    for pixel in image.pixels() {
        histogram[usize::from(pixel.0[0])] += 1;
    }

    let lo = histogram.iter().position(|&n| n > 0);
    let hi = histogram.iter().rposition(|&n| n > 0);
    let (Some(lo), Some(hi)) = (lo, hi) else {
        return image.clone();
    };
    if hi <= lo {
        return image.clone();
    }

    let span = hi - lo;
    let mut lut = [0u8; 256];
    for (value, slot) in lut.iter_mut().enumerate() {
        let stretched = value.saturating_sub(lo) * 255 / span;
        *slot = u8::try_from(stretched.min(255)).unwrap_or(u8::MAX);
    }

    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = lut[usize::from(pixel.0[0])];
    }
    out
}

/// Produces the grayscale frame handed to the decoder for one rotation.
///
/// The image is rotated, converted to luma and contrast-stretched. If its
/// shorter side is then below `upscale_min_dimension` it is doubled in both
/// dimensions with a bilinear filter.
#[must_use]
pub fn prepare(image: &DynamicImage, rotation: Rotation, upscale_min_dimension: u32) -> GrayImage {
    let rotated = rotation.apply(image);
    let gray = autocontrast(&rotated.to_luma8());

    let (width, height) = gray.dimensions();
    if width.min(height) >= upscale_min_dimension {
        return gray;
    }

    debug!(
        width,
        height,
        rotation = rotation.degrees(),
        "upscaling small image 2x"
    );
    imageops::resize(&gray, width * 2, height * 2, FilterType::Triangle)
}
