use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use flume::Receiver;
use tracing::{info, warn};

use super::channel::BridgeRequest;
use crate::protocol::{BridgeResponse, ExtensionMessage};

/// Tab-level audio control available to the background context.
#[async_trait]
pub trait TabAudio: Send + Sync {
    async fn set_muted(&self, muted: bool) -> Result<(), String>;
}

/// Tab audio state held in memory.
#[derive(Default)]
pub struct MemoryTabAudio {
    muted: AtomicBool,
    refuse: AtomicBool,
}

impl MemoryTabAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    /// Makes every subsequent change fail.
    pub fn refuse_changes(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }
}

#[async_trait]
impl TabAudio for MemoryTabAudio {
    async fn set_muted(&self, muted: bool) -> Result<(), String> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err("tab is not controllable".to_string());
        }
        self.muted.store(muted, Ordering::SeqCst);
        Ok(())
    }
}

/// Serves bridge requests against a [`TabAudio`].
pub struct BackgroundService<A> {
    audio: A,
    page_url: Option<String>,
}

impl<A: TabAudio> BackgroundService<A> {
    pub fn new(audio: A) -> Self {
        Self {
            audio,
            page_url: None,
        }
    }

    pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = Some(url.into());
        self
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub async fn handle(&self, message: ExtensionMessage) -> BridgeResponse {
        match message {
            ExtensionMessage::MuteTab { reason } => {
                let reason = reason.as_deref().unwrap_or("unspecified");
                match self.audio.set_muted(true).await {
                    Ok(()) => {
                        info!("Tab muted due to: {}", reason);
                        BridgeResponse::ok()
                    }
                    Err(e) => {
                        warn!("Failed to mute tab ({}): {}", reason, e);
                        BridgeResponse::failed()
                    }
                }
            }
            ExtensionMessage::UnmuteTab { reason } => match self.audio.set_muted(false).await {
                Ok(()) => {
                    info!("Tab unmuted ({})", reason.as_deref().unwrap_or("unspecified"));
                    BridgeResponse::ok()
                }
                Err(e) => {
                    warn!("Failed to unmute tab: {}", e);
                    BridgeResponse::failed()
                }
            },
            ExtensionMessage::AdDetected {
                url,
                ad_type,
                fallback_to_tab_mute,
            } => {
                let page = self.page_url.as_deref().unwrap_or("<unknown page>");
                info!(
                    "Ad detected on page: {} ({}, src: {}, tab fallback: {})",
                    page,
                    ad_type,
                    url.as_deref().unwrap_or("-"),
                    fallback_to_tab_mute
                );
                BridgeResponse::ok()
            }
        }
    }

    /// Answers requests until every bridge handle is dropped.
    pub async fn run(self, rx: Receiver<BridgeRequest>) {
        while let Ok(request) = rx.recv_async().await {
            let response = self.handle(request.message.clone()).await;
            request.respond(response);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bridge::{ChannelBridge, TabBridge};

    #[async_trait]
    impl TabAudio for Arc<MemoryTabAudio> {
        async fn set_muted(&self, muted: bool) -> Result<(), String> {
            self.as_ref().set_muted(muted).await
        }
    }

    #[tokio::test]
    async fn serves_mute_and_unmute() {
        let audio = Arc::new(MemoryTabAudio::new());
        let (bridge, rx) = ChannelBridge::new();
        let service = BackgroundService::new(audio.clone());
        let task = tokio::spawn(service.run(rx));

        let muted = bridge
            .request(ExtensionMessage::mute_tab("canvas-ad-unmutable"))
            .await
            .unwrap();
        assert!(muted.success);
        assert!(audio.is_muted());

        bridge.notify(ExtensionMessage::AdDetected {
            url: None,
            ad_type: "canvas-ad".into(),
            fallback_to_tab_mute: true,
        });

        let unmuted = bridge
            .request(ExtensionMessage::unmute_tab("canvas-ad-unmutable"))
            .await
            .unwrap();
        assert!(unmuted.success);
        assert!(!audio.is_muted());

        drop(bridge);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn reports_failure_without_changing_state() {
        let service = BackgroundService::new(MemoryTabAudio::new());
        service.audio().refuse_changes(true);
        let response = service.handle(ExtensionMessage::mute_tab("legacy-unmutable")).await;
        assert!(!response.success);
        assert!(!service.audio().is_muted());
    }
}
