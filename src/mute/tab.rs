use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    bridge::TabBridge,
    common::types::Shared,
    protocol::ExtensionMessage,
};

/// Whether the whole tab is muted by us, and for which tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabMuteState {
    pub muted_by_us: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabOutcome {
    Applied,
    /// Already muted by us with the same tag.
    AlreadyMuted,
    /// Already muted by us with a different tag; that tag stays active.
    MutedForOther,
    /// Unmute skipped: we do not own a mute with this tag.
    NotOwned,
    /// Another request for the tab is still in flight.
    Busy,
    /// The background answered `success: false`.
    Rejected,
    /// The round-trip itself failed.
    Failed,
    /// The state was reset while the request was in flight.
    Superseded,
}

#[derive(Debug, Default)]
struct TabInner {
    state: TabMuteState,
    in_flight: Option<u64>,
    seq: u64,
}

impl TabInner {
    fn begin(&mut self) -> u64 {
        self.seq += 1;
        self.in_flight = Some(self.seq);
        self.seq
    }

    fn finish(&mut self, seq: u64) -> bool {
        if self.in_flight == Some(seq) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }
}

/// Tab-level mute, driven through the privileged bridge.
///
/// Single writer: at most one request is in flight and a concurrent caller
/// gets [`TabOutcome::Busy`]. State only changes on `success: true`, and a
/// reply is applied only if no reset happened while it was pending.
#[derive(Clone)]
pub struct TabMuter {
    inner: Shared<TabInner>,
    bridge: Arc<dyn TabBridge>,
}

impl TabMuter {
    pub fn new(bridge: Arc<dyn TabBridge>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TabInner::default())),
            bridge,
        }
    }

    pub fn state(&self) -> TabMuteState {
        self.inner.lock().state.clone()
    }

    pub fn is_muted_for(&self, reason: &str) -> bool {
        let inner = self.inner.lock();
        inner.state.muted_by_us && inner.state.reason.as_deref() == Some(reason)
    }

    pub fn is_busy(&self) -> bool {
        self.inner.lock().in_flight.is_some()
    }

    pub async fn mute(&self, reason: &str) -> TabOutcome {
        let seq = {
            let mut inner = self.inner.lock();
            if inner.in_flight.is_some() {
                return TabOutcome::Busy;
            }
            if inner.state.muted_by_us {
                return if inner.state.reason.as_deref() == Some(reason) {
                    TabOutcome::AlreadyMuted
                } else {
                    TabOutcome::MutedForOther
                };
            }
            inner.begin()
        };

        let result = self.bridge.request(ExtensionMessage::mute_tab(reason)).await;

        let mut inner = self.inner.lock();
        if !inner.finish(seq) {
            debug!("Dropping stale tab mute reply ({})", reason);
            return TabOutcome::Superseded;
        }
        match result {
            Ok(response) if response.success => {
                inner.state = TabMuteState {
                    muted_by_us: true,
                    reason: Some(reason.to_string()),
                };
                info!("Tab muted due to: {}", reason);
                TabOutcome::Applied
            }
            Ok(_) => {
                warn!("Background refused to mute the tab ({})", reason);
                TabOutcome::Rejected
            }
            Err(e) => {
                warn!("Failed to mute tab: {}", e);
                TabOutcome::Failed
            }
        }
    }

    /// Unmutes the tab only if it is muted by us with exactly this tag.
    pub async fn unmute(&self, reason: &str) -> TabOutcome {
        let seq = {
            let mut inner = self.inner.lock();
            if inner.in_flight.is_some() {
                return TabOutcome::Busy;
            }
            if !inner.state.muted_by_us || inner.state.reason.as_deref() != Some(reason) {
                debug!(
                    "Not unmuting tab for {}: active tag is {:?}",
                    reason, inner.state.reason
                );
                return TabOutcome::NotOwned;
            }
            inner.begin()
        };

        let result = self
            .bridge
            .request(ExtensionMessage::unmute_tab(reason))
            .await;

        let mut inner = self.inner.lock();
        if !inner.finish(seq) {
            debug!("Dropping stale tab unmute reply ({})", reason);
            return TabOutcome::Superseded;
        }
        match result {
            Ok(response) if response.success => {
                inner.state = TabMuteState::default();
                info!("Tab unmuted ({})", reason);
                TabOutcome::Applied
            }
            Ok(_) => {
                warn!("Background refused to unmute the tab ({})", reason);
                TabOutcome::Rejected
            }
            Err(e) => {
                warn!("Failed to unmute tab: {}", e);
                TabOutcome::Failed
            }
        }
    }

    pub fn notify(&self, message: ExtensionMessage) {
        self.bridge.notify(message);
    }

    /// Forgets all state; replies still in flight are ignored.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.state = TabMuteState::default();
        inner.in_flight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bridge::{BridgeRequest, ChannelBridge},
        protocol::BridgeResponse,
    };
    use flume::Receiver;

    fn muter() -> (TabMuter, Receiver<BridgeRequest>) {
        let (bridge, rx) = ChannelBridge::new();
        (TabMuter::new(Arc::new(bridge)), rx)
    }

    async fn answer(rx: &Receiver<BridgeRequest>, success: bool) -> ExtensionMessage {
        let request = rx.recv_async().await.unwrap();
        let message = request.message.clone();
        request.respond(BridgeResponse { success });
        message
    }

    #[tokio::test]
    async fn state_changes_only_on_success() {
        let (tab, rx) = muter();

        let (outcome, _) = tokio::join!(tab.mute("legacy-unmutable"), answer(&rx, false));
        assert_eq!(outcome, TabOutcome::Rejected);
        assert_eq!(tab.state(), TabMuteState::default());

        let (outcome, sent) = tokio::join!(tab.mute("legacy-unmutable"), answer(&rx, true));
        assert_eq!(outcome, TabOutcome::Applied);
        assert_eq!(sent, ExtensionMessage::mute_tab("legacy-unmutable"));
        assert!(tab.is_muted_for("legacy-unmutable"));

        assert_eq!(tab.mute("legacy-unmutable").await, TabOutcome::AlreadyMuted);
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn unmute_requires_matching_tag() {
        let (tab, rx) = muter();
        assert_eq!(tab.unmute("overlay-ad-unmutable").await, TabOutcome::NotOwned);
        assert!(rx.is_empty());

        let (outcome, _) = tokio::join!(tab.mute("overlay-ad-unmutable"), answer(&rx, true));
        assert_eq!(outcome, TabOutcome::Applied);

        // a different context asks for its own mute, then its unmute
        assert_eq!(tab.mute("jw-player-ad-unmutable").await, TabOutcome::MutedForOther);
        assert_eq!(tab.unmute("jw-player-ad-unmutable").await, TabOutcome::NotOwned);
        assert!(rx.is_empty());
        assert!(tab.is_muted_for("overlay-ad-unmutable"));

        let (outcome, sent) = tokio::join!(tab.unmute("overlay-ad-unmutable"), answer(&rx, true));
        assert_eq!(outcome, TabOutcome::Applied);
        assert_eq!(sent, ExtensionMessage::unmute_tab("overlay-ad-unmutable"));
        assert!(!tab.state().muted_by_us);
    }

    #[tokio::test]
    async fn concurrent_requests_do_not_cross_talk() {
        let (tab, rx) = muter();
        let (outcome, _) = tokio::join!(tab.mute("overlay-ad-unmutable"), answer(&rx, true));
        assert_eq!(outcome, TabOutcome::Applied);

        // the overlay unmute is held in flight while the player path races it
        let (unmuted, _) = tokio::join!(tab.unmute("overlay-ad-unmutable"), async {
            let request = rx.recv_async().await.unwrap();
            assert!(tab.is_busy());
            assert_eq!(tab.mute("jw-player-ad-unmutable").await, TabOutcome::Busy);
            assert_eq!(tab.unmute("jw-player-ad-unmutable").await, TabOutcome::Busy);
            assert!(tab.is_muted_for("overlay-ad-unmutable"));
            request.respond(BridgeResponse::ok());
        });
        assert_eq!(unmuted, TabOutcome::Applied);
        assert_eq!(tab.state(), TabMuteState::default());
    }

    #[tokio::test]
    async fn reply_after_reset_is_ignored() {
        let (tab, rx) = muter();
        let (outcome, _) = tokio::join!(tab.mute("canvas-ad-unmutable"), async {
            let request = rx.recv_async().await.unwrap();
            tab.reset();
            request.respond(BridgeResponse::ok());
        });
        assert_eq!(outcome, TabOutcome::Superseded);
        assert!(!tab.state().muted_by_us);
        assert!(!tab.is_busy());
    }

    #[tokio::test]
    async fn bridge_failure_leaves_state() {
        let (bridge, rx) = ChannelBridge::new();
        drop(rx);
        let tab = TabMuter::new(Arc::new(bridge));
        assert_eq!(tab.mute("legacy-unmutable").await, TabOutcome::Failed);
        assert!(!tab.state().muted_by_us);
        assert!(!tab.is_busy());
    }
}
