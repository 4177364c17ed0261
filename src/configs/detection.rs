use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DetectionConfig {
    /// Minimum interval between two full scans.
    #[serde(default = "default_scan_throttle_ms")]
    pub scan_throttle_ms: u64,
    /// Coarse timer that rescans (and sweeps dead nodes) regardless of mutations.
    #[serde(default = "default_fallback_scan_ms")]
    pub fallback_scan_ms: u64,
    /// Click a visible skip button once the skip offset is reached.
    #[serde(default = "default_true")]
    pub auto_skip: bool,
    #[serde(default = "default_skip_offset_secs")]
    pub default_skip_offset_secs: f64,
    /// Upper bound on duration for the short pre-roll heuristic.
    #[serde(default = "default_short_ad_max_secs")]
    pub short_ad_max_secs: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            scan_throttle_ms: default_scan_throttle_ms(),
            fallback_scan_ms: default_fallback_scan_ms(),
            auto_skip: true,
            default_skip_offset_secs: default_skip_offset_secs(),
            short_ad_max_secs: default_short_ad_max_secs(),
        }
    }
}

fn default_scan_throttle_ms() -> u64 {
    300
}

fn default_fallback_scan_ms() -> u64 {
    3000
}

fn default_skip_offset_secs() -> f64 {
    5.0
}

fn default_short_ad_max_secs() -> f64 {
    60.0
}

fn default_true() -> bool {
    true
}
