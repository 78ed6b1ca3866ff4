//! EAN/UPC module-width tables and pattern matching.

/// Left-hand odd-parity ("L") digit widths, space first. Right-hand ("R")
/// digits use the same widths starting with a bar; even-parity ("G") digits
/// are the L widths reversed.
pub(crate) const L_PATTERNS: [[u8; 4]; 10] = [
    [3, 2, 1, 1],
    [2, 2, 2, 1],
    [2, 1, 2, 2],
    [1, 4, 1, 1],
    [1, 1, 3, 2],
    [1, 2, 3, 1],
    [1, 1, 1, 4],
    [1, 3, 1, 2],
    [1, 2, 1, 3],
    [3, 1, 1, 2],
];

pub(crate) const GUARD: [u8; 3] = [1, 1, 1];
pub(crate) const MIDDLE_GUARD: [u8; 5] = [1, 1, 1, 1, 1];
pub(crate) const UPCE_END_GUARD: [u8; 6] = [1, 1, 1, 1, 1, 1];

/// L/G parity of the six left digits of an EAN-13, indexed by the implied
/// first digit. Bit 5 is the leftmost digit; a set bit means G.
pub(crate) const EAN13_FIRST_DIGIT_PARITY: [u8; 10] =
    [0x00, 0x0B, 0x0D, 0x0E, 0x13, 0x19, 0x1C, 0x15, 0x16, 0x1A];

/// UPC-E parity for number system 0, indexed by check digit. Number system 1
/// uses the complement.
pub(crate) const UPCE_PARITY_NS0: [u8; 10] =
    [0x38, 0x34, 0x32, 0x31, 0x2C, 0x26, 0x23, 0x2A, 0x29, 0x25];

const MAX_AVG_VARIANCE: f32 = 0.48;
const MAX_INDIVIDUAL_VARIANCE: f32 = 0.7;

/// Parity of a matched left-hand digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Parity {
    L,
    G,
}

/// Average per-pixel deviation of `counters` from `pattern` once the pattern
/// is scaled to the same total width, or `None` if any single element is
/// off by more than 0.7 modules.
pub(crate) fn pattern_variance(counters: &[u32], pattern: &[u8]) -> Option<f32> {
    let total: u32 = counters.iter().sum();
    let modules: u32 = pattern.iter().map(|&p| u32::from(p)).sum();
    if total < modules {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let unit = total as f32 / modules as f32;
    let max_individual = MAX_INDIVIDUAL_VARIANCE * unit;

    let mut variance = 0.0_f32;
    for (&count, &p) in counters.iter().zip(pattern) {
        #[allow(clippy::cast_precision_loss)]
        let diff = (count as f32 - f32::from(p) * unit).abs();
        if diff > max_individual {
            return None;
        }
        variance += diff;
    }

    #[allow(clippy::cast_precision_loss)]
    let avg = variance / total as f32;
    Some(avg)
}

/// `true` if `counters` match `pattern` closely enough to accept.
pub(crate) fn matches(counters: &[u32], pattern: &[u8]) -> bool {
    pattern_variance(counters, pattern).is_some_and(|v| v < MAX_AVG_VARIANCE)
}

/// Best L or G digit for four left-hand run widths.
pub(crate) fn match_left_digit(counters: &[u32]) -> Option<(u8, Parity)> {
    let mut best: Option<(f32, u8, Parity)> = None;
    for (digit, widths) in (0u8..).zip(L_PATTERNS.iter()) {
        let mut reversed = *widths;
        reversed.reverse();
        for (pattern, parity) in [(*widths, Parity::L), (reversed, Parity::G)] {
            if let Some(v) = pattern_variance(counters, &pattern) {
                if best.is_none_or(|(b, _, _)| v < b) {
                    best = Some((v, digit, parity));
                }
            }
        }
    }
    best.filter(|(v, _, _)| *v < MAX_AVG_VARIANCE)
        .map(|(_, digit, parity)| (digit, parity))
}

/// Best right-hand (R) digit for four run widths.
pub(crate) fn match_right_digit(counters: &[u32]) -> Option<u8> {
    let mut best: Option<(f32, u8)> = None;
    for (digit, widths) in (0u8..).zip(L_PATTERNS.iter()) {
        if let Some(v) = pattern_variance(counters, widths) {
            if best.is_none_or(|(b, _)| v < b) {
                best = Some((v, digit));
            }
        }
    }
    best.filter(|(v, _)| *v < MAX_AVG_VARIANCE).map(|(_, digit)| digit)
}

/// Verifies the trailing GS1 check digit of an EAN-8/UPC-A/EAN-13 digit
/// sequence.
pub(crate) fn check_digit_ok(digits: &[u8]) -> bool {
    let Some((&check, body)) = digits.split_last() else {
        return false;
    };
    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    (10 - sum % 10) % 10 == u32::from(check)
}
