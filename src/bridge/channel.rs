use async_trait::async_trait;
use flume::{Receiver, Sender};
use tracing::trace;

use super::TabBridge;
use crate::{
    common::errors::BridgeError,
    protocol::{BridgeResponse, ExtensionMessage},
};

pub struct BridgeRequest {
    pub message: ExtensionMessage,
    /// `None` for notices that expect no reply.
    pub reply: Option<Sender<BridgeResponse>>,
}

impl BridgeRequest {
    pub fn respond(self, response: BridgeResponse) {
        if let Some(reply) = self.reply {
            let _ = reply.send(response);
        }
    }
}

/// A [`TabBridge`] backed by an in-process channel.
#[derive(Clone)]
pub struct ChannelBridge {
    tx: Sender<BridgeRequest>,
}

impl ChannelBridge {
    pub fn new() -> (Self, Receiver<BridgeRequest>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl TabBridge for ChannelBridge {
    async fn request(&self, message: ExtensionMessage) -> Result<BridgeResponse, BridgeError> {
        let (reply_tx, reply_rx) = flume::bounded(1);
        self.tx
            .send_async(BridgeRequest {
                message,
                reply: Some(reply_tx),
            })
            .await
            .map_err(|_| BridgeError::Disconnected)?;

        reply_rx.recv_async().await.map_err(|_| BridgeError::Closed)
    }

    fn notify(&self, message: ExtensionMessage) {
        if self
            .tx
            .send(BridgeRequest {
                message,
                reply: None,
            })
            .is_err()
        {
            trace!("Dropped notice, background is gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_round_trip() {
        let (bridge, rx) = ChannelBridge::new();
        let server = tokio::spawn(async move {
            let request = rx.recv_async().await.unwrap();
            assert_eq!(request.message, ExtensionMessage::mute_tab("legacy-unmutable"));
            request.respond(BridgeResponse::ok());
        });

        let response = bridge
            .request(ExtensionMessage::mute_tab("legacy-unmutable"))
            .await
            .unwrap();
        assert!(response.success);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn dropped_request_is_closed() {
        let (bridge, rx) = ChannelBridge::new();
        let server = tokio::spawn(async move {
            // answer nothing
            drop(rx.recv_async().await.unwrap());
        });

        let err = bridge
            .request(ExtensionMessage::unmute_tab("legacy-unmutable"))
            .await
            .unwrap_err();
        assert_eq!(err, BridgeError::Closed);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn missing_background_is_disconnected() {
        let (bridge, rx) = ChannelBridge::new();
        drop(rx);
        let err = bridge
            .request(ExtensionMessage::mute_tab("x"))
            .await
            .unwrap_err();
        assert_eq!(err, BridgeError::Disconnected);
        bridge.notify(ExtensionMessage::mute_tab("x"));
    }
}
