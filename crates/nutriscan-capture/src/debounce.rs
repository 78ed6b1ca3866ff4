use std::time::Duration;

use nutriscan_core::CanonicalBarcode;
use tokio::time::Instant;

/// Window during which the same barcode is not processed again.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(3);

/// Suppresses repeat detections of the barcode that was processed last.
///
/// Only the most recent barcode is remembered. A different barcode is always
/// accepted, and so is the same one once `window` has elapsed since it was
/// recorded.
#[derive(Debug, Clone)]
pub struct Debounce {
    window: Duration,
    last: Option<(CanonicalBarcode, Instant)>,
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debounce {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    #[must_use]
    pub fn should_process(&self, barcode: &CanonicalBarcode, now: Instant) -> bool {
        match &self.last {
            Some((last, at)) if last == barcode => now.saturating_duration_since(*at) >= self.window,
            _ => true,
        }
    }

    /// Marks `barcode` as processed at `now`.
    pub fn record(&mut self, barcode: CanonicalBarcode, now: Instant) {
        self.last = Some((barcode, now));
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}
