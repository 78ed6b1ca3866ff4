use std::fmt;

use serde::Serialize;

/// Retail 1-D symbologies the decoders report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Symbology {
    Ean13,
    Ean8,
    UpcA,
    UpcE,
}

impl Symbology {
    /// The set searched in still photos of product packaging.
    pub const RETAIL: [Symbology; 4] = [Self::Ean13, Self::Ean8, Self::UpcA, Self::UpcE];

    /// Name as printed by common decoder libraries (`EAN13`, `UPCA`, ...).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ean13 => "EAN13",
            Self::Ean8 => "EAN8",
            Self::UpcA => "UPCA",
            Self::UpcE => "UPCE",
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
