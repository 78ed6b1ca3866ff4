//! Pure-Rust EAN/UPC scanline decoder.
//!
//! Samples horizontal rows, binarizes each pixel against the mean of its
//! neighbourhood on that row and matches the bar/space run widths against the EAN-13, EAN-8 and UPC-E
//! layouts. Every row is read in both directions, so upside-down symbols are
//! found without a separate rotation pass. Vertical symbols are not: callers
//! rotate the image for those.

use image::GrayImage;
use tracing::trace;

use super::patterns::{
    check_digit_ok, match_left_digit, match_right_digit, matches, Parity,
    EAN13_FIRST_DIGIT_PARITY, GUARD, MIDDLE_GUARD, UPCE_END_GUARD, UPCE_PARITY_NS0,
};
use super::{BoundingRegion, DecodedSymbol, SymbolDecoder};
use crate::symbology::Symbology;

/// Upper bound on sampled rows per image.
const SCAN_ROWS: u32 = 48;

/// Rows with less spread than this between darkest and lightest pixel are
/// skipped.
const MIN_CONTRAST: u8 = 32;

/// The local-mean window reaches this fraction of the row width either side
/// of a pixel.
const LOCAL_WINDOW_FRACTION: usize = 16;

/// Smallest local-mean window radius, in pixels.
const MIN_LOCAL_RADIUS: usize = 8;

/// Minimum blank margin on either side of a symbol, in modules.
const QUIET_ZONE_MODULES: f32 = 5.0;

/// Reads EAN-13, EAN-8, UPC-A and UPC-E symbols from horizontal scanlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanlineDecoder;

impl ScanlineDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SymbolDecoder for ScanlineDecoder {
    fn decode(&self, image: &GrayImage, allowed: &[Symbology]) -> Vec<DecodedSymbol> {
        let (width, height) = image.dimensions();
        let mut symbols: Vec<DecodedSymbol> = Vec::new();

        for y in sample_rows(height) {
            let mut row: Vec<u8> = (0..width).map(|x| image.get_pixel(x, y).0[0]).collect();
            let Some(runs) = run_lengths(&row) else {
                continue;
            };
            let forward = scan_runs(&runs, width, allowed);

            row.reverse();
            let backward = run_lengths(&row)
                .map(|runs| scan_runs(&runs, width, allowed))
                .unwrap_or_default()
                .into_iter()
                .map(|hit| RowHit {
                    start: width - hit.end,
                    end: width - hit.start,
                    ..hit
                });

            for hit in forward.into_iter().chain(backward) {
                let region = BoundingRegion {
                    x: hit.start,
                    y,
                    width: hit.end - hit.start,
                    height: 1,
                };
                merge(&mut symbols, hit.symbology, hit.payload, region);
            }
        }

        if !symbols.is_empty() {
            trace!(count = symbols.len(), width, height, "scanline decode");
        }
        symbols
    }
}

#[derive(Debug, Clone, Copy)]
struct Run {
    bar: bool,
    start: u32,
    len: u32,
}

impl Run {
    fn end(self) -> u32 {
        self.start + self.len
    }
}

#[derive(Debug)]
struct RowHit {
    payload: String,
    symbology: Symbology,
    start: u32,
    end: u32,
}

#[derive(Debug, Clone, Copy)]
enum Layout {
    Ean13,
    Ean8,
    UpcE,
}

impl Layout {
    /// Bar and space runs from the first guard bar to the last.
    fn runs(self) -> usize {
        match self {
            Self::Ean13 => 59,
            Self::Ean8 => 43,
            Self::UpcE => 33,
        }
    }

    fn modules(self) -> u32 {
        match self {
            Self::Ean13 => 95,
            Self::Ean8 => 67,
            Self::UpcE => 51,
        }
    }
}

fn sample_rows(height: u32) -> Vec<u32> {
    if height <= SCAN_ROWS {
        return (0..height).collect();
    }
    (0..SCAN_ROWS)
        .map(|k| (2 * k + 1) * height / (2 * SCAN_ROWS))
        .collect()
}

fn run_lengths(row: &[u8]) -> Option<Vec<Run>> {
    let mut runs: Vec<Run> = Vec::new();
    for (x, bar) in (0u32..).zip(binarize(row)?) {
        match runs.last_mut() {
            Some(run) if run.bar == bar => run.len += 1,
            _ => runs.push(Run {
                bar,
                start: x,
                len: 1,
            }),
        }
    }
    Some(runs)
}

/// Marks each pixel as bar when it is darker than the mean of the pixels
/// around it, less a margin scaled to the row's contrast. Lighting that falls
/// off across a label shifts the mean with it, so shadowed spaces stay
/// spaces.
fn binarize(row: &[u8]) -> Option<Vec<bool>> {
    let min = *row.iter().min()?;
    let max = *row.iter().max()?;
    if max - min < MIN_CONTRAST {
        return None;
    }
    let margin = u64::from(max - min) / 16;
    let radius = (row.len() / LOCAL_WINDOW_FRACTION).max(MIN_LOCAL_RADIUS);

    let mut prefix: Vec<u64> = Vec::with_capacity(row.len() + 1);
    prefix.push(0);
    for &px in row {
        let last = prefix.last().copied().unwrap_or(0);
        prefix.push(last + u64::from(px));
    }

    let bars = row
        .iter()
        .enumerate()
        .map(|(x, &px)| {
            let lo = x.saturating_sub(radius);
            let hi = (x + radius + 1).min(row.len());
            let mean = (prefix[hi] - prefix[lo]) / (hi - lo) as u64;
            u64::from(px) + margin < mean
        })
        .collect();
    Some(bars)
}

fn scan_runs(runs: &[Run], row_width: u32, allowed: &[Symbology]) -> Vec<RowHit> {
    let mut hits = Vec::new();
    let mut i = 0;
    while i < runs.len() {
        if !runs[i].bar {
            i += 1;
            continue;
        }
        match read_symbol(runs, i, row_width, allowed) {
            Some((hit, consumed)) => {
                hits.push(hit);
                i += consumed;
            }
            None => i += 1,
        }
    }
    hits
}

/// Tries each layout with its first guard bar at `runs[i]`.
fn read_symbol(
    runs: &[Run],
    i: usize,
    row_width: u32,
    allowed: &[Symbology],
) -> Option<(RowHit, usize)> {
    let hit = |symbology, payload, layout: Layout| {
        let last = runs[i + layout.runs() - 1];
        (
            RowHit {
                payload,
                symbology,
                start: runs[i].start,
                end: last.end(),
            },
            layout.runs(),
        )
    };

    if allowed.contains(&Symbology::Ean13) || allowed.contains(&Symbology::UpcA) {
        if let Some(digits) = window(runs, i, row_width, Layout::Ean13).and_then(|c| read_ean13(&c))
        {
            if let Some((symbology, payload)) = classify_ean13(&digits, allowed) {
                return Some(hit(symbology, payload, Layout::Ean13));
            }
        }
    }

    if allowed.contains(&Symbology::Ean8) {
        if let Some(digits) = window(runs, i, row_width, Layout::Ean8).and_then(|c| read_ean8(&c)) {
            return Some(hit(Symbology::Ean8, to_text(&digits), Layout::Ean8));
        }
    }

    if allowed.contains(&Symbology::UpcE) {
        if let Some(digits) = window(runs, i, row_width, Layout::UpcE).and_then(|c| read_upce(&c)) {
            return Some(hit(Symbology::UpcE, to_text(&digits), Layout::UpcE));
        }
    }

    None
}

/// Run widths for a `layout`-sized symbol at `runs[i]`, if it has a quiet
/// zone on both sides. A margin cut off by the image edge counts as quiet.
#[allow(clippy::cast_precision_loss)]
fn window(runs: &[Run], i: usize, row_width: u32, layout: Layout) -> Option<Vec<u32>> {
    let n = layout.runs();
    let symbol = runs.get(i..i + n)?;
    let counters: Vec<u32> = symbol.iter().map(|r| r.len).collect();
    let total: u32 = counters.iter().sum();
    let quiet = QUIET_ZONE_MODULES * total as f32 / layout.modules() as f32;

    let leading_ok = match i.checked_sub(1).and_then(|j| runs.get(j)) {
        None => true,
        Some(prev) => prev.start == 0 || prev.len as f32 >= quiet,
    };
    let trailing_ok = match runs.get(i + n) {
        None => true,
        Some(next) => next.end() == row_width || next.len as f32 >= quiet,
    };

    (leading_ok && trailing_ok).then_some(counters)
}

fn read_ean13(c: &[u32]) -> Option<Vec<u8>> {
    if !matches(&c[0..3], &GUARD) {
        return None;
    }

    let mut digits = vec![0u8];
    let mut parity_bits = 0u8;
    for d in 0..6 {
        let start = 3 + 4 * d;
        let (digit, parity) = match_left_digit(&c[start..start + 4])?;
        digits.push(digit);
        if parity == Parity::G {
            parity_bits |= 1 << (5 - d);
        }
    }

    if !matches(&c[27..32], &MIDDLE_GUARD) {
        return None;
    }
    for d in 0..6 {
        let start = 32 + 4 * d;
        digits.push(match_right_digit(&c[start..start + 4])?);
    }
    if !matches(&c[56..59], &GUARD) {
        return None;
    }

    let first = (0u8..).zip(EAN13_FIRST_DIGIT_PARITY).find(|&(_, p)| p == parity_bits)?.0;
    digits[0] = first;
    check_digit_ok(&digits).then_some(digits)
}

fn read_ean8(c: &[u32]) -> Option<Vec<u8>> {
    if !matches(&c[0..3], &GUARD) {
        return None;
    }

    let mut digits = Vec::with_capacity(8);
    for d in 0..4 {
        let start = 3 + 4 * d;
        match match_left_digit(&c[start..start + 4])? {
            (digit, Parity::L) => digits.push(digit),
            (_, Parity::G) => return None,
        }
    }

    if !matches(&c[19..24], &MIDDLE_GUARD) {
        return None;
    }
    for d in 0..4 {
        let start = 24 + 4 * d;
        digits.push(match_right_digit(&c[start..start + 4])?);
    }
    if !matches(&c[40..43], &GUARD) {
        return None;
    }

    check_digit_ok(&digits).then_some(digits)
}

/// Returns `[number system, six data digits, check digit]`.
fn read_upce(c: &[u32]) -> Option<Vec<u8>> {
    if !matches(&c[0..3], &GUARD) {
        return None;
    }

    let mut data = Vec::with_capacity(6);
    let mut parity_bits = 0u8;
    for d in 0..6 {
        let start = 3 + 4 * d;
        let (digit, parity) = match_left_digit(&c[start..start + 4])?;
        data.push(digit);
        if parity == Parity::G {
            parity_bits |= 1 << (5 - d);
        }
    }

    if !matches(&c[27..33], &UPCE_END_GUARD) {
        return None;
    }

    let (number_system, check) = (0u8..2)
        .flat_map(|ns| (0u8..10).map(move |check| (ns, check)))
        .find(|&(ns, check)| {
            let pattern = UPCE_PARITY_NS0[usize::from(check)];
            let pattern = if ns == 0 { pattern } else { 0x3F ^ pattern };
            pattern == parity_bits
        })?;

    let mut expanded = upce_to_upca(number_system, &data);
    expanded.push(check);
    if !check_digit_ok(&expanded) {
        return None;
    }

    let mut digits = Vec::with_capacity(8);
    digits.push(number_system);
    digits.extend_from_slice(&data);
    digits.push(check);
    Some(digits)
}

/// The eleven UPC-A data digits a zero-suppressed UPC-E body stands for.
fn upce_to_upca(number_system: u8, d: &[u8]) -> Vec<u8> {
    let mut out = vec![number_system];
    match d[5] {
        0..=2 => out.extend_from_slice(&[d[0], d[1], d[5], 0, 0, 0, 0, d[2], d[3], d[4]]),
        3 => out.extend_from_slice(&[d[0], d[1], d[2], 0, 0, 0, 0, 0, d[3], d[4]]),
        4 => out.extend_from_slice(&[d[0], d[1], d[2], d[3], 0, 0, 0, 0, 0, d[4]]),
        _ => out.extend_from_slice(&[d[0], d[1], d[2], d[3], d[4], 0, 0, 0, 0, d[5]]),
    }
    out
}

/// An EAN-13 with a leading zero is a UPC-A; report it that way when UPC-A
/// is being searched for.
fn classify_ean13(digits: &[u8], allowed: &[Symbology]) -> Option<(Symbology, String)> {
    let text = to_text(digits);
    if digits[0] == 0 && allowed.contains(&Symbology::UpcA) {
        return Some((Symbology::UpcA, text[1..].to_string()));
    }
    allowed
        .contains(&Symbology::Ean13)
        .then_some((Symbology::Ean13, text))
}

fn to_text(digits: &[u8]) -> String {
    digits.iter().map(|&d| char::from(b'0' + d)).collect()
}

fn merge(
    symbols: &mut Vec<DecodedSymbol>,
    symbology: Symbology,
    payload: String,
    region: BoundingRegion,
) {
    if let Some(existing) = symbols
        .iter_mut()
        .find(|s| s.symbology == symbology && s.payload == payload)
    {
        existing.region = existing.region.union(region);
        return;
    }
    symbols.push(DecodedSymbol {
        payload,
        symbology,
        region,
    });
}
