use std::sync::Arc;

use super::capabilities::Capabilities;
use crate::common::{errors::ProbeError, types::NodeId};

/// Advertising configuration reported by a player.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdvertisingConfig {
    /// Ad tag URL; present only while an ad schedule is active.
    pub tag: Option<String>,
    /// Seconds after which the ad becomes skippable.
    pub skip_offset: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerStatus {
    Idle,
    Buffering,
    Playing,
    Paused,
    Complete,
    Other(String),
}

impl PlayerStatus {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "idle" => Self::Idle,
            "buffering" => Self::Buffering,
            "playing" => Self::Playing,
            "paused" => Self::Paused,
            "complete" => Self::Complete,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Playing | Self::Buffering)
    }
}

/// Ad lifecycle notifications delivered by event-capable players.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    AdStarted,
    AdEnded,
    /// The player switched items; `ad_playing` is its own report.
    VideoChanged { ad_playing: bool },
    Play,
    /// Periodic progress while an ad plays, in seconds.
    AdTime { position: f64 },
}

impl PlayerEvent {
    /// Maps the event names used by the common player libraries.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "adImpression" | "adStart" | "adStarted" | "ad_start" | "PLAYER_ADSTART" => {
                Some(Self::AdStarted)
            }
            "adComplete" | "adSkipped" | "adError" | "adEnd" | "ad_end" | "PLAYER_ADEND" => {
                Some(Self::AdEnded)
            }
            "play" => Some(Self::Play),
            _ => None,
        }
    }
}

/// A third-party player instance, seen through duck-typed probes.
///
/// Every accessor has a default that reports the method as missing, so an
/// implementation only overrides what the underlying object really has.
/// Absence is "unknown", never "not an ad".
pub trait PlayerObject: Send + Sync {
    fn exposes(&self, capability: Capabilities) -> bool;

    fn ad_block(&self) -> Result<bool, ProbeError> {
        Err(ProbeError::Unsupported("getAdBlock"))
    }

    /// `file` of the current playlist item.
    fn playlist_item_file(&self) -> Result<Option<String>, ProbeError> {
        Err(ProbeError::Unsupported("getPlaylistItem"))
    }

    fn advertising(&self) -> Result<Option<AdvertisingConfig>, ProbeError> {
        Err(ProbeError::Unsupported("getAdvertising"))
    }

    fn state(&self) -> Result<PlayerStatus, ProbeError> {
        Err(ProbeError::Unsupported("getState"))
    }

    fn container(&self) -> Result<Option<NodeId>, ProbeError> {
        Err(ProbeError::Unsupported("getContainer"))
    }

    fn position(&self) -> Result<f64, ProbeError> {
        Err(ProbeError::Unsupported("getPosition"))
    }

    fn duration(&self) -> Result<f64, ProbeError> {
        Err(ProbeError::Unsupported("getDuration"))
    }

    fn volume(&self) -> Result<f64, ProbeError> {
        Err(ProbeError::Unsupported("getVolume"))
    }

    fn set_muted(&self, _muted: bool) -> Result<(), ProbeError> {
        Err(ProbeError::Unsupported("setMute"))
    }

    fn set_volume(&self, _volume: f64) -> Result<(), ProbeError> {
        Err(ProbeError::Unsupported("setVolume"))
    }
}

/// The page's global player factory, when one is loaded.
pub trait PlayerLibrary: Send + Sync {
    /// Every live instance; `None` when the factory has no such method.
    fn all_players(&self) -> Option<Vec<Arc<dyn PlayerObject>>>;

    /// The instance returned by calling the factory with no arguments.
    fn default_player(&self) -> Option<Arc<dyn PlayerObject>>;

    fn player_by_id(&self, id: &str) -> Result<Option<Arc<dyn PlayerObject>>, ProbeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_library_event_names() {
        assert_eq!(PlayerEvent::from_name("adImpression"), Some(PlayerEvent::AdStarted));
        assert_eq!(PlayerEvent::from_name("PLAYER_ADEND"), Some(PlayerEvent::AdEnded));
        assert_eq!(PlayerEvent::from_name("adSkipped"), Some(PlayerEvent::AdEnded));
        assert_eq!(PlayerEvent::from_name("seek"), None);
    }

    #[test]
    fn status_names_are_case_insensitive() {
        assert_eq!(PlayerStatus::from_name("PLAYING"), PlayerStatus::Playing);
        assert!(PlayerStatus::from_name("buffering").is_active());
        assert!(!PlayerStatus::from_name("paused").is_active());
    }
}
