//! Canonical barcode strings used as database lookup keys.
//!
//! Decoders hand back whatever payload the symbol carried, which may include
//! separators, check-digit suffixes rendered with spaces, or stray
//! non-digit artifacts. [`normalize`] is the only way to obtain a
//! [`CanonicalBarcode`], so every lookup key in the system has been through
//! the same length rules.

use std::fmt;

use serde::Serialize;

use crate::BarcodeError;

/// Length every padded code is widened to (EAN-13).
const PADDED_LEN: usize = 13;

/// A digits-only barcode ready to be used as a lookup key.
///
/// Lengths 8, 12 and 13 are passed through from the decoder unchanged.
/// Codes of length 11 or shorter than 8 are left-padded with zeros to 13
/// digits. This padding does not recompute an EAN-13 check digit, so a
/// padded code can be well-formed and still never resolve. Callers depend on
/// the padded form, so it is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalBarcode(String);

impl CanonicalBarcode {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: normalization rejects inputs without digits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalBarcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalBarcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a raw decoder payload (or manually typed code) into a
/// [`CanonicalBarcode`].
///
/// Every non-digit character is stripped first. Then, by digit count:
///
/// | digits | result |
/// |---|---|
/// | 8, 12, 13 | unchanged |
/// | 11 | left-padded with zeros to 13 |
/// | 1..=7 | left-padded with zeros to 13 |
/// | 9, 10, 14+ | unchanged |
///
/// # Errors
///
/// Returns [`BarcodeError::InvalidBarcode`] if `raw` contains no digits.
pub fn normalize(raw: &str) -> Result<CanonicalBarcode, BarcodeError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    if digits.is_empty() {
        return Err(BarcodeError::InvalidBarcode {
            input: raw.to_owned(),
        });
    }

    let canonical = match digits.len() {
        11 | 1..=7 => format!("{digits:0>width$}", width = PADDED_LEN),
        _ => digits,
    };

    Ok(CanonicalBarcode(canonical))
}
