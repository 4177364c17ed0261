use std::collections::HashMap;

use crate::common::types::CandidateKey;

/// Why a candidate was muted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuteReason {
    VideoSrcAd,
    OverlayAd,
    Legacy,
    CanvasAd,
    PlayerAd,
}

impl MuteReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VideoSrcAd => "video-src-ad",
            Self::OverlayAd => "overlay-ad",
            Self::Legacy => "legacy",
            Self::CanvasAd => "canvas-ad",
            Self::PlayerAd => "jw-player-ad",
        }
    }

    /// Tag sent with a tab-level mute taken on behalf of this reason.
    pub fn tab_reason(self) -> String {
        format!("{}-unmutable", self.as_str())
    }
}

impl std::fmt::Display for MuteReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the mute was applied, and therefore how to undo it.
#[derive(Debug, Clone, PartialEq)]
pub enum MutePath {
    /// `muted = true` on the media element.
    Element,
    /// The player's own mute; volume is restored after the next gesture.
    Player { previous_volume: Option<f64> },
    /// Tab-level fallback, tagged with the reason sent to the background.
    Tab { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MuteRecord {
    pub muted_by_us: bool,
    pub reason: MuteReason,
    pub path: MutePath,
}

/// Per-candidate mute ownership. A candidate without an entry is
/// unmuted content.
#[derive(Debug, Default)]
pub struct MuteRecords {
    records: HashMap<CandidateKey, MuteRecord>,
}

impl MuteRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: CandidateKey) -> Option<&MuteRecord> {
        self.records.get(&key)
    }

    pub fn is_muted_by_us(&self, key: CandidateKey) -> bool {
        self.get(key).is_some_and(|record| record.muted_by_us)
    }

    pub fn reason(&self, key: CandidateKey) -> Option<MuteReason> {
        self.get(key).map(|record| record.reason)
    }

    pub fn claim(&mut self, key: CandidateKey, reason: MuteReason, path: MutePath) {
        self.records.insert(
            key,
            MuteRecord {
                muted_by_us: true,
                reason,
                path,
            },
        );
    }

    pub fn release(&mut self, key: CandidateKey) -> Option<MuteRecord> {
        self.records.remove(&key)
    }

    /// Whether any candidate still relies on a tab mute with this tag.
    pub fn holds_tab_reason(&self, tab_reason: &str) -> bool {
        self.records
            .values()
            .any(|record| matches!(&record.path, MutePath::Tab { reason } if reason == tab_reason))
    }

    pub fn keys(&self) -> Vec<CandidateKey> {
        self.records.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
