use std::time::{Duration, Instant};

use crate::configs::DetectionConfig;

/// Bounds full scans to one per `min_interval`, with a coarse fallback
/// that scans even when nothing asked for it.
#[derive(Debug, Clone)]
pub struct ScanThrottle {
    min_interval: Duration,
    fallback_interval: Duration,
    last_scan: Option<Instant>,
    pending: bool,
}

impl ScanThrottle {
    pub fn new(min_interval: Duration, fallback_interval: Duration) -> Self {
        Self {
            min_interval,
            fallback_interval,
            last_scan: None,
            pending: false,
        }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(
            Duration::from_millis(config.scan_throttle_ms),
            Duration::from_millis(config.fallback_scan_ms),
        )
    }

    fn elapsed(&self, now: Instant) -> Option<Duration> {
        self.last_scan
            .map(|last| now.saturating_duration_since(last))
    }

    /// A change wants a scan. Returns true if it may run now; otherwise the
    /// request is remembered and picked up by [`Self::due`].
    pub fn request(&mut self, now: Instant) -> bool {
        if self.elapsed(now).is_none_or(|elapsed| elapsed >= self.min_interval) {
            return true;
        }
        self.pending = true;
        false
    }

    /// Whether a timer tick at `now` should scan.
    pub fn due(&self, now: Instant) -> bool {
        match self.elapsed(now) {
            None => true,
            Some(elapsed) => {
                (self.pending && elapsed >= self.min_interval) || elapsed >= self.fallback_interval
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn mark_scanned(&mut self, now: Instant) {
        self.last_scan = Some(now);
        self.pending = false;
    }

    pub fn reset(&mut self) {
        self.last_scan = None;
        self.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttle() -> ScanThrottle {
        ScanThrottle::from_config(&DetectionConfig::default())
    }

    #[test]
    fn requests_inside_interval_are_deferred() {
        let start = Instant::now();
        let mut throttle = throttle();
        assert!(throttle.request(start));
        throttle.mark_scanned(start);

        assert!(!throttle.request(start + Duration::from_millis(100)));
        assert!(throttle.is_pending());
        assert!(!throttle.due(start + Duration::from_millis(200)));
        assert!(throttle.due(start + Duration::from_millis(300)));
    }

    #[test]
    fn fallback_fires_without_requests() {
        let start = Instant::now();
        let mut throttle = throttle();
        throttle.mark_scanned(start);

        assert!(!throttle.due(start + Duration::from_millis(2999)));
        assert!(throttle.due(start + Duration::from_secs(3)));
    }

    #[test]
    fn first_tick_always_scans() {
        assert!(throttle().due(Instant::now()));
    }
}
