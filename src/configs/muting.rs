use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MutingConfig {
    /// Hold audio restores (tab unmute, player volume) until the first user
    /// gesture.
    #[serde(default = "default_true")]
    pub gesture_gated_tab_unmute: bool,
    /// Volume restored on a player when none was saved at mute time.
    #[serde(default = "default_fallback_volume")]
    pub fallback_volume: f64,
    /// Send `adDetected` notices to the background context.
    #[serde(default = "default_true")]
    pub notify_background: bool,
}

impl Default for MutingConfig {
    fn default() -> Self {
        Self {
            gesture_gated_tab_unmute: true,
            fallback_volume: default_fallback_volume(),
            notify_background: true,
        }
    }
}

fn default_fallback_volume() -> f64 {
    0.5
}

fn default_true() -> bool {
    true
}
