use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use super::{
    gesture::PendingRestore,
    record::{MutePath, MuteReason},
    tab::TabOutcome,
};
use crate::{
    common::types::{CandidateKey, PlayerHandle},
    context::PageContext,
    detection::{find_overlay_ad_iframes, is_ad, is_video_ad},
    dom::{self, Dom, NodeId, Tag},
    player::{Capabilities, PlayerEvent, PlayerLibrary, find_player_instances, is_player_ad, try_skip},
    protocol::ExtensionMessage,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteOutcome {
    /// Muted at the element or player.
    Muted,
    /// Muted through the tab-level fallback.
    TabFallback,
    /// We already own a mute for this candidate.
    AlreadyMuted,
    /// The user muted it; we leave it alone and claim nothing.
    UserMuted,
    /// The tab is busy or held for another ad; a later event retries.
    Deferred,
    Failed,
}

/// Decides which mute to apply when an ad shows up and which to undo when
/// it ends. Owns no state: everything page-scoped lives in [`PageContext`].
pub struct MuteCoordinator {
    dom: Arc<dyn Dom>,
    library: Option<Arc<dyn PlayerLibrary>>,
}

impl MuteCoordinator {
    pub fn new(dom: Arc<dyn Dom>, library: Option<Arc<dyn PlayerLibrary>>) -> Self {
        Self { dom, library }
    }

    pub fn dom(&self) -> &dyn Dom {
        self.dom.as_ref()
    }

    /// Re-checks a video (or video canvas) after a possible source change.
    pub async fn evaluate_video(&self, ctx: &mut PageContext, node: NodeId) {
        let dom = self.dom();
        match dom.tag(node) {
            Some(Tag::Video) => {}
            Some(Tag::Canvas) => return self.evaluate_canvas(ctx, node).await,
            _ => return,
        }

        let key = CandidateKey::Node(node);
        let current = match dom.current_src(node) {
            Ok(src) => src.filter(|src| !src.is_empty()),
            Err(e) => {
                debug!("Cannot read source of {}: {}", node, e);
                return;
            }
        };

        if ctx.sources.observe(key, current.as_deref()) == super::SourceChange::Unchanged {
            return;
        }

        if current.is_some() && is_video_ad(dom, &ctx.domains, node) {
            self.on_ad_detected(ctx, key, MuteReason::VideoSrcAd, current.as_deref())
                .await;
        } else if ctx.records.reason(key) == Some(MuteReason::VideoSrcAd) {
            debug!("{} switched back to content", node);
            self.revert(ctx, key).await;
        }
    }

    async fn evaluate_canvas(&self, ctx: &mut PageContext, node: NodeId) {
        let key = CandidateKey::Node(node);
        let is_ad = is_video_ad(self.dom(), &ctx.domains, node);

        if is_ad && !ctx.records.is_muted_by_us(key) {
            self.on_ad_detected(ctx, key, MuteReason::CanvasAd, None).await;
        } else if !is_ad && ctx.records.reason(key) == Some(MuteReason::CanvasAd) {
            self.revert(ctx, key).await;
        }
    }

    /// Hides ad iframes layered over a visible video and mutes the video
    /// underneath while any of them remains.
    pub async fn evaluate_overlays(&self, ctx: &mut PageContext, video: NodeId) {
        let dom = self.dom();
        if dom.tag(video) != Some(Tag::Video) {
            return;
        }

        let key = CandidateKey::Node(video);
        let visible = dom.bounding_rect(video).is_ok_and(|rect| !rect.is_empty());
        let mut active = false;

        if visible {
            for iframe in find_overlay_ad_iframes(dom, &ctx.domains, video) {
                if ctx.overlays.hide(dom, iframe, video) {
                    info!("Hid overlay ad {} covering {}", iframe, video);
                }
                active = true;
            }
        }
        if !ctx.overlays.active_for(dom, &ctx.domains, video).is_empty() {
            active = true;
        }

        if active {
            if !ctx.records.is_muted_by_us(key) && !is_video_ad(dom, &ctx.domains, video) {
                self.on_ad_detected(ctx, key, MuteReason::OverlayAd, None)
                    .await;
            }
            return;
        }

        let restored = ctx.overlays.restore_for(dom, video);
        if restored > 0 {
            debug!("Restored {} overlay iframe(s) on {}", restored, video);
        }
        if ctx.records.reason(key) == Some(MuteReason::OverlayAd) {
            self.revert(ctx, key).await;
        }
    }

    /// Mutes playing videos found inside ad-looking containers.
    pub async fn sweep_ad_containers(&self, ctx: &mut PageContext) {
        let dom = self.dom();
        let mut targets = Vec::new();

        for container in dom::all_elements(dom) {
            if matches!(
                dom.tag(container),
                Some(Tag::Video | Tag::Canvas | Tag::Iframe) | None
            ) {
                continue;
            }
            if !is_ad(dom, &ctx.domains, container) {
                continue;
            }
            for node in dom::descendants(dom, container) {
                if dom.tag(node) == Some(Tag::Video)
                    && !dom.is_paused(node)
                    && !dom.is_muted(node)
                    && !targets.contains(&node)
                {
                    targets.push(node);
                }
            }
        }

        for node in targets {
            let key = CandidateKey::Node(node);
            if ctx.records.is_muted_by_us(key) {
                continue;
            }
            let src = dom.current_src(node).ok().flatten();
            self.on_ad_detected(ctx, key, MuteReason::Legacy, src.as_deref())
                .await;
        }
    }

    /// The "ad detected" transition. Idempotent per candidate.
    pub async fn on_ad_detected(
        &self,
        ctx: &mut PageContext,
        key: CandidateKey,
        reason: MuteReason,
        src: Option<&str>,
    ) -> MuteOutcome {
        if ctx.records.is_muted_by_us(key) {
            trace!("{} already muted by us", key);
            return MuteOutcome::AlreadyMuted;
        }

        match key {
            CandidateKey::Node(node) if reason != MuteReason::CanvasAd => {
                let dom = self.dom();
                if dom.is_muted(node) {
                    debug!("{} was muted by the user, leaving it alone", node);
                    return MuteOutcome::UserMuted;
                }
                match dom.set_muted(node, true) {
                    Ok(()) => {
                        ctx.records.claim(key, reason, MutePath::Element);
                        info!("Muted {} ({})", node, reason);
                        self.notify(ctx, reason, src, false);
                        return MuteOutcome::Muted;
                    }
                    Err(e) => warn!("Could not mute {} ({}), falling back to the tab", node, e),
                }
            }
            CandidateKey::Player(handle) => {
                if self.mute_player(ctx, handle, reason) {
                    self.notify(ctx, reason, src, false);
                    return MuteOutcome::Muted;
                }
            }
            CandidateKey::Node(_) => {}
        }

        self.mute_tab(ctx, key, reason, src).await
    }

    fn mute_player(&self, ctx: &mut PageContext, handle: PlayerHandle, reason: MuteReason) -> bool {
        let Some(player) = ctx.players.get(handle) else {
            return false;
        };
        if !player.has(Capabilities::MUTE) {
            debug!("{} cannot be muted directly", handle);
            return false;
        }

        let previous_volume = if player.has(Capabilities::VOLUME) {
            player.object.volume().ok()
        } else {
            None
        };

        if let Err(e) = player.object.set_muted(true) {
            warn!("Could not mute {} ({}), falling back to the tab", handle, e);
            return false;
        }
        if player.has(Capabilities::VOLUME) {
            if let Err(e) = player.object.set_volume(0.0) {
                debug!("Could not zero volume on {}: {}", handle, e);
            }
        }

        ctx.records
            .claim(handle.into(), reason, MutePath::Player { previous_volume });
        info!("Muted {} ({})", handle, reason);
        true
    }

    async fn mute_tab(
        &self,
        ctx: &mut PageContext,
        key: CandidateKey,
        reason: MuteReason,
        src: Option<&str>,
    ) -> MuteOutcome {
        let tab_reason = reason.tab_reason();
        match ctx.tab.mute(&tab_reason).await {
            TabOutcome::Applied | TabOutcome::AlreadyMuted => {
                ctx.records.claim(key, reason, MutePath::Tab { reason: tab_reason });
                self.notify(ctx, reason, src, true);
                MuteOutcome::TabFallback
            }
            TabOutcome::Busy | TabOutcome::MutedForOther => {
                debug!("Tab mute for {} deferred", key);
                ctx.sources.forget(key);
                MuteOutcome::Deferred
            }
            outcome => {
                debug!("Tab mute for {} not applied: {:?}", key, outcome);
                ctx.sources.forget(key);
                MuteOutcome::Failed
            }
        }
    }

    fn notify(&self, ctx: &PageContext, reason: MuteReason, src: Option<&str>, fallback: bool) {
        if !ctx.muting.notify_background {
            return;
        }
        ctx.tab.notify(ExtensionMessage::AdDetected {
            url: src.map(str::to_string),
            ad_type: reason.as_str().to_string(),
            fallback_to_tab_mute: fallback,
        });
    }

    /// Undoes our mute on `key`. A no-op when we own none.
    pub async fn revert(&self, ctx: &mut PageContext, key: CandidateKey) -> bool {
        let Some(record) = ctx.records.release(key) else {
            trace!("Nothing to revert on {}", key);
            return false;
        };

        match (record.path, key) {
            (MutePath::Element, CandidateKey::Node(node)) => match self.dom().set_muted(node, false) {
                Ok(()) => info!("Unmuted {} ({})", node, record.reason),
                Err(e) => warn!("Could not unmute {}: {}", node, e),
            },
            (MutePath::Player { previous_volume }, CandidateKey::Player(handle)) => {
                let volume = previous_volume
                    .filter(|volume| *volume > 0.0)
                    .unwrap_or(ctx.muting.fallback_volume);
                self.schedule_restore(ctx, PendingRestore::Player { handle, volume })
                    .await;
            }
            (MutePath::Tab { reason }, _) => self.release_tab(ctx, reason).await,
            (path, key) => warn!("Mute record on {} has mismatched path {:?}", key, path),
        }
        true
    }

    async fn release_tab(&self, ctx: &mut PageContext, reason: String) {
        if ctx.records.holds_tab_reason(&reason) {
            debug!("Tab mute {} still held by another candidate", reason);
            return;
        }
        self.schedule_restore(ctx, PendingRestore::Tab { reason })
            .await;
    }

    async fn schedule_restore(&self, ctx: &mut PageContext, restore: PendingRestore) {
        if !ctx.muting.gesture_gated_tab_unmute {
            return self.perform_restore(ctx, restore).await;
        }
        match ctx.gate.defer(restore) {
            Some(ready) => self.perform_restore(ctx, ready).await,
            None => debug!("Audio restore waits for a user gesture"),
        }
    }

    async fn perform_restore(&self, ctx: &mut PageContext, restore: PendingRestore) {
        match restore {
            PendingRestore::Player { handle, volume } => {
                if ctx.records.is_muted_by_us(handle.into()) {
                    debug!("{} was muted again, skipping restore", handle);
                    return;
                }
                let Some(player) = ctx.players.get(handle) else {
                    return;
                };
                let result = player.object.set_muted(false).and_then(|_| {
                    if player.has(Capabilities::VOLUME) {
                        player.object.set_volume(volume)
                    } else {
                        Ok(())
                    }
                });
                match result {
                    Ok(()) => info!("Unmuted {} at volume {:.2}", handle, volume),
                    Err(e) => warn!("Un-mute was blocked or failed on {}: {}", handle, e),
                }
            }
            PendingRestore::Tab { reason } => {
                if ctx.records.holds_tab_reason(&reason) {
                    debug!("Tab mute {} was claimed again, skipping restore", reason);
                    return;
                }
                let outcome = ctx.tab.unmute(&reason).await;
                trace!("Tab unmute for {}: {:?}", reason, outcome);
            }
        }
    }

    /// The first qualifying user gesture opens the gate and runs every
    /// queued restore.
    pub async fn on_user_gesture(&self, ctx: &mut PageContext) {
        if ctx.gate.is_open() {
            return;
        }
        for restore in ctx.gate.open() {
            self.perform_restore(ctx, restore).await;
        }
    }

    pub async fn on_media_ended(&self, ctx: &mut PageContext, node: NodeId) {
        let key = CandidateKey::Node(node);
        if !ctx.records.is_muted_by_us(key) {
            return;
        }
        debug!("{} ended while muted by us", node);
        // a replay of the same creative must count as a new source
        if ctx.records.reason(key) == Some(MuteReason::VideoSrcAd) {
            ctx.sources.forget(key);
        }
        self.revert(ctx, key).await;
    }

    /// Registers newly discovered player objects; returns their handles.
    pub fn discover_players(&self, ctx: &mut PageContext) -> Vec<PlayerHandle> {
        find_player_instances(self.library.as_deref(), self.dom())
            .into_iter()
            .filter_map(|object| {
                let (handle, new) = ctx.players.register(object);
                new.then_some(handle)
            })
            .collect()
    }

    /// Polls a player's ad state.
    ///
    /// Players that deliver events are only reverted by their own end
    /// events; a negative poll mid-ad is too common to trust.
    pub async fn evaluate_player(&self, ctx: &mut PageContext, handle: PlayerHandle) {
        let (showing_ad, has_events) = {
            let Some(player) = ctx.players.get(handle) else {
                return;
            };
            (
                is_player_ad(self.dom(), &ctx.domains, &ctx.detection, player),
                player.has(Capabilities::EVENTS),
            )
        };

        let key = CandidateKey::Player(handle);
        if showing_ad {
            if !ctx.records.is_muted_by_us(key) {
                self.on_ad_detected(ctx, key, MuteReason::PlayerAd, None)
                    .await;
            }
        } else if !has_events && ctx.records.reason(key) == Some(MuteReason::PlayerAd) {
            self.revert(ctx, key).await;
        }
    }

    pub async fn on_player_event(
        &self,
        ctx: &mut PageContext,
        handle: PlayerHandle,
        event: PlayerEvent,
    ) {
        let key = CandidateKey::Player(handle);
        match event {
            PlayerEvent::AdStarted | PlayerEvent::VideoChanged { ad_playing: true } => {
                self.on_ad_detected(ctx, key, MuteReason::PlayerAd, None)
                    .await;
            }
            PlayerEvent::AdEnded | PlayerEvent::VideoChanged { ad_playing: false } => {
                if ctx.records.reason(key) == Some(MuteReason::PlayerAd) {
                    self.revert(ctx, key).await;
                }
            }
            PlayerEvent::Play => self.evaluate_player(ctx, handle).await,
            PlayerEvent::AdTime { position } => {
                if let Some(player) = ctx.players.get(handle) {
                    try_skip(self.dom(), &ctx.detection, player, position);
                }
            }
        }
    }

    /// Drops state for nodes that left the document. A dropped record that
    /// held the tab mute releases it.
    pub async fn sweep_dead(&self, ctx: &mut PageContext) -> usize {
        let dom = Arc::clone(&self.dom);
        let detached = |key: &CandidateKey| matches!(key, CandidateKey::Node(node) if !dom.is_connected(*node));

        let mut swept = 0;
        for key in ctx.records.keys().into_iter().filter(detached) {
            if let Some(record) = ctx.records.release(key) {
                swept += 1;
                trace!("Dropped mute record of detached {}", key);
                if let MutePath::Tab { reason } = record.path {
                    self.release_tab(ctx, reason).await;
                }
            }
        }
        for key in ctx.sources.keys().into_iter().filter(detached) {
            ctx.sources.forget(key);
        }
        swept += ctx.listeners.sweep(dom.as_ref());
        swept += ctx.overlays.sweep(dom.as_ref());
        swept
    }

    /// Navigation boundary: gives back a tab mute we still own, then forgets
    /// the page.
    pub async fn reset_page(&self, ctx: &mut PageContext) {
        let state = ctx.tab.state();
        if let (true, Some(reason)) = (state.muted_by_us, state.reason) {
            let outcome = ctx.tab.unmute(&reason).await;
            debug!("Released tab mute {} on navigation: {:?}", reason, outcome);
        }
        ctx.reset();
    }
}
