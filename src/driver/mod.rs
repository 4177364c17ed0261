//! Turns page activity into coordinator calls.
//!
//! The host forwards DOM mutations, media element events, player events,
//! timer ticks, user gestures and navigations. Full scans are throttled;
//! a coarse fallback tick rescans and sweeps detached nodes.

pub mod listeners;
pub mod throttle;

use std::time::Instant;

use tracing::{debug, trace};

pub use listeners::ListenerTable;
pub use throttle::ScanThrottle;

use crate::{
    common::types::PlayerHandle,
    context::PageContext,
    detection::{find_all_videos, main_content_video},
    dom::{self, Dom, NodeId, Tag},
    mute::MuteCoordinator,
    player::{PlayerEvent, adapter::is_player_container},
};

/// Attributes whose change means a new media source.
const SOURCE_ATTRIBUTES: &[&str] = &["src", "currentsrc"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Added(NodeId),
    Removed(NodeId),
    Attribute { node: NodeId, name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    LoadStart,
    LoadedMetadata,
    CanPlay,
    Play,
    Playing,
    Ended,
}

impl MediaEvent {
    /// Events the host subscribes to on every registered media node.
    pub const ALL: [MediaEvent; 6] = [
        Self::LoadStart,
        Self::LoadedMetadata,
        Self::CanPlay,
        Self::Play,
        Self::Playing,
        Self::Ended,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "loadstart" => Self::LoadStart,
            "loadedmetadata" => Self::LoadedMetadata,
            "canplay" => Self::CanPlay,
            "play" => Self::Play,
            "playing" => Self::Playing,
            "ended" => Self::Ended,
            _ => return None,
        })
    }
}

/// Result of a full scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    /// Media nodes seen for the first time; attach listeners to these.
    pub newly_registered: Vec<NodeId>,
    /// The page's main content video, evaluated first.
    pub main_video: Option<NodeId>,
    /// Players seen for the first time; subscribe to their events.
    pub new_players: Vec<PlayerHandle>,
    /// Table entries dropped because their node left the document.
    pub swept: usize,
}

pub struct PageDriver {
    coordinator: MuteCoordinator,
    ctx: PageContext,
    throttle: ScanThrottle,
}

impl PageDriver {
    pub fn new(coordinator: MuteCoordinator, ctx: PageContext) -> Self {
        let throttle = ScanThrottle::from_config(&ctx.detection);
        Self {
            coordinator,
            ctx,
            throttle,
        }
    }

    pub fn context(&self) -> &PageContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut PageContext {
        &mut self.ctx
    }

    pub fn coordinator(&self) -> &MuteCoordinator {
        &self.coordinator
    }

    /// Initial scan at page load.
    pub async fn start(&mut self, now: Instant) -> ScanReport {
        self.scan(now).await
    }

    pub async fn on_mutations(&mut self, mutations: &[Mutation], now: Instant) -> Option<ScanReport> {
        let mut relevant = false;
        let mut removed = false;

        for mutation in mutations {
            match mutation {
                Mutation::Added(node) => relevant |= self.is_relevant_addition(*node),
                Mutation::Removed(_) => removed = true,
                Mutation::Attribute { node, name } => {
                    let name = name.to_ascii_lowercase();
                    if !SOURCE_ATTRIBUTES.contains(&name.as_str())
                        || self.coordinator.dom().tag(*node) != Some(Tag::Video)
                    {
                        continue;
                    }
                    if self.ctx.listeners.is_registered(*node) {
                        self.coordinator
                            .evaluate_video(&mut self.ctx, *node)
                            .await;
                    }
                    relevant = true;
                }
            }
        }

        if removed {
            let swept = self.coordinator.sweep_dead(&mut self.ctx).await;
            trace!("Removal swept {} entries", swept);
        }

        if relevant && self.throttle.request(now) {
            return Some(self.scan(now).await);
        }
        None
    }

    fn is_relevant_addition(&self, node: NodeId) -> bool {
        let dom = self.coordinator.dom();
        let is_media = |n: NodeId| dom.tag(n).is_some_and(|tag| tag.is_media());

        is_media(node)
            || is_player_container(dom, node)
            || dom::descendants(dom, node).into_iter().any(is_media)
    }

    pub async fn on_media_event(&mut self, node: NodeId, event: MediaEvent) {
        trace!("{:?} on {}", event, node);
        match event {
            MediaEvent::Ended => self.coordinator.on_media_ended(&mut self.ctx, node).await,
            MediaEvent::Play | MediaEvent::Playing => {
                self.coordinator.evaluate_video(&mut self.ctx, node).await;
                self.coordinator
                    .evaluate_overlays(&mut self.ctx, node)
                    .await;
            }
            _ => self.coordinator.evaluate_video(&mut self.ctx, node).await,
        }
    }

    pub async fn on_player_event(&mut self, handle: PlayerHandle, event: PlayerEvent) {
        self.coordinator
            .on_player_event(&mut self.ctx, handle, event)
            .await;
    }

    /// Timer tick: runs a deferred or fallback scan when one is due.
    pub async fn on_tick(&mut self, now: Instant) -> Option<ScanReport> {
        if !self.throttle.due(now) {
            return None;
        }
        Some(self.scan(now).await)
    }

    pub async fn on_user_gesture(&mut self) {
        self.coordinator.on_user_gesture(&mut self.ctx).await;
    }

    pub async fn on_navigation(&mut self) {
        self.coordinator.reset_page(&mut self.ctx).await;
        self.throttle.reset();
    }

    /// Full scan: every video and video canvas, ad containers, players,
    /// then a liveness sweep.
    pub async fn scan(&mut self, now: Instant) -> ScanReport {
        self.throttle.mark_scanned(now);
        let mut report = ScanReport::default();

        let dom = self.coordinator.dom();
        report.main_video = main_content_video(dom);
        let mut videos = find_all_videos(dom);
        if let Some(main) = report.main_video {
            videos.retain(|&node| node != main);
            videos.insert(0, main);
        }

        for node in videos {
            if self.ctx.listeners.register(node) {
                report.newly_registered.push(node);
            }
            self.coordinator.evaluate_video(&mut self.ctx, node).await;
            self.coordinator
                .evaluate_overlays(&mut self.ctx, node)
                .await;
        }

        self.coordinator.sweep_ad_containers(&mut self.ctx).await;

        report.new_players = self.coordinator.discover_players(&mut self.ctx);
        for handle in self.ctx.players.handles() {
            self.coordinator.evaluate_player(&mut self.ctx, handle).await;
        }

        report.swept = self.coordinator.sweep_dead(&mut self.ctx).await;
        debug!(
            "Scan: {} new media, {} new players, {} swept",
            report.newly_registered.len(),
            report.new_players.len(),
            report.swept
        );
        report
    }
}
