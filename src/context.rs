//! Page-scoped state shared by the coordinator and the driver.

use std::sync::Arc;

use crate::{
    configs::{Config, DetectionConfig, MutingConfig},
    domains::AdDomains,
    driver::ListenerTable,
    mute::{GestureGate, HiddenOverlays, MuteRecords, SourceTracker, TabMuter},
    player::PlayerRegistry,
};

/// Everything that lives for one page. Created at load, reset on
/// navigation; only the ad-domain set survives a reset.
pub struct PageContext {
    pub domains: Arc<AdDomains>,
    pub records: MuteRecords,
    pub sources: SourceTracker,
    pub tab: TabMuter,
    pub players: PlayerRegistry,
    pub listeners: ListenerTable,
    pub overlays: HiddenOverlays,
    pub gate: GestureGate,
    pub detection: DetectionConfig,
    pub muting: MutingConfig,
}

impl PageContext {
    pub fn new(domains: Arc<AdDomains>, tab: TabMuter, config: &Config) -> Self {
        Self {
            domains,
            records: MuteRecords::new(),
            sources: SourceTracker::new(),
            tab,
            players: PlayerRegistry::new(),
            listeners: ListenerTable::new(),
            overlays: HiddenOverlays::new(),
            gate: GestureGate::new(),
            detection: config.detection.clone(),
            muting: config.muting.clone(),
        }
    }

    pub fn reset(&mut self) {
        self.records.clear();
        self.sources.clear();
        self.players.clear();
        self.listeners.clear();
        self.overlays.clear();
        self.gate.reset();
        self.tab.reset();
    }
}
