//! Synthetic barcode images for decoder and extractor tests.

use image::{imageops, GrayImage, Luma};

use crate::decode::patterns::{EAN13_FIRST_DIGIT_PARITY, L_PATTERNS, UPCE_PARITY_NS0};

const QUIET_MODULES: usize = 10;

fn digits(code: &str) -> Vec<usize> {
    code.bytes().map(|b| usize::from(b - b'0')).collect()
}

fn push(modules: &mut Vec<bool>, widths: &[u8], bar_first: bool) {
    let mut bar = bar_first;
    for &w in widths {
        modules.extend(std::iter::repeat_n(bar, usize::from(w)));
        bar = !bar;
    }
}

fn left_digit(modules: &mut Vec<bool>, digit: usize, even: bool) {
    let mut widths = L_PATTERNS[digit];
    if even {
        widths.reverse();
    }
    push(modules, &widths, false);
}

fn right_digit(modules: &mut Vec<bool>, digit: usize) {
    push(modules, &L_PATTERNS[digit], true);
}

fn paint(modules: &[bool], module_px: u32, height: u32) -> GrayImage {
    let total = modules.len() + 2 * QUIET_MODULES;
    let width = u32::try_from(total).expect("test image width") * module_px;
    GrayImage::from_fn(width, height, |x, _| {
        let module = (x / module_px) as usize;
        let bar = module
            .checked_sub(QUIET_MODULES)
            .and_then(|m| modules.get(m))
            .copied()
            .unwrap_or(false);
        Luma([if bar { 0 } else { 255 }])
    })
}

/// Renders a 13-digit EAN-13. The check digit is drawn as given.
pub(crate) fn render_ean13(code: &str, module_px: u32, height: u32) -> GrayImage {
    let d = digits(code);
    assert_eq!(d.len(), 13, "EAN-13 needs 13 digits");
    let parity = EAN13_FIRST_DIGIT_PARITY[d[0]];

    let mut modules = Vec::new();
    push(&mut modules, &[1, 1, 1], true);
    for (i, &digit) in d[1..7].iter().enumerate() {
        left_digit(&mut modules, digit, parity & (1 << (5 - i)) != 0);
    }
    push(&mut modules, &[1, 1, 1, 1, 1], false);
    for &digit in &d[7..] {
        right_digit(&mut modules, digit);
    }
    push(&mut modules, &[1, 1, 1], true);
    paint(&modules, module_px, height)
}

/// Renders a 12-digit UPC-A (an EAN-13 with a leading zero).
pub(crate) fn render_upca(code: &str, module_px: u32, height: u32) -> GrayImage {
    render_ean13(&format!("0{code}"), module_px, height)
}

pub(crate) fn render_ean8(code: &str, module_px: u32, height: u32) -> GrayImage {
    let d = digits(code);
    assert_eq!(d.len(), 8, "EAN-8 needs 8 digits");

    let mut modules = Vec::new();
    push(&mut modules, &[1, 1, 1], true);
    for &digit in &d[..4] {
        left_digit(&mut modules, digit, false);
    }
    push(&mut modules, &[1, 1, 1, 1, 1], false);
    for &digit in &d[4..] {
        right_digit(&mut modules, digit);
    }
    push(&mut modules, &[1, 1, 1], true);
    paint(&modules, module_px, height)
}

/// Renders an 8-digit UPC-E payload: number system, six data digits, check.
pub(crate) fn render_upce(code: &str, module_px: u32, height: u32) -> GrayImage {
    let d = digits(code);
    assert_eq!(d.len(), 8, "UPC-E needs 8 digits");
    let mut parity = UPCE_PARITY_NS0[d[7]];
    if d[0] == 1 {
        parity ^= 0x3F;
    }

    let mut modules = Vec::new();
    push(&mut modules, &[1, 1, 1], true);
    for (i, &digit) in d[1..7].iter().enumerate() {
        left_digit(&mut modules, digit, parity & (1 << (5 - i)) != 0);
    }
    push(&mut modules, &[1, 1, 1, 1, 1, 1], false);
    paint(&modules, module_px, height)
}

/// Relights a black-on-white render so the paper brightness ramps from
/// `dark` at the left edge to `light` at the right. Bars reflect 30% of the
/// light that reaches them.
pub(crate) fn falloff(image: &GrayImage, dark: u8, light: u8) -> GrayImage {
    let span = image.width().saturating_sub(1).max(1);
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let paper = u32::from(dark) + (u32::from(light) - u32::from(dark)) * x / span;
        let value = if image.get_pixel(x, y).0[0] < 128 {
            paper * 3 / 10
        } else {
            paper
        };
        Luma([u8::try_from(value).expect("paper brightness fits in u8")])
    })
}

pub(crate) fn blank(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([255]))
}

/// Stacks images vertically on a white background, left-aligned.
pub(crate) fn stack(images: &[GrayImage]) -> GrayImage {
    let width = images.iter().map(GrayImage::width).max().unwrap_or(0);
    let height = images.iter().map(GrayImage::height).sum();
    let mut out = blank(width, height);
    let mut y = 0;
    for image in images {
        imageops::replace(&mut out, image, 0, i64::from(y));
        y += image.height();
    }
    out
}
