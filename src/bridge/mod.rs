//! Request/response plumbing to the privileged background context.

pub mod background;
pub mod channel;

use async_trait::async_trait;

pub use background::{BackgroundService, MemoryTabAudio, TabAudio};
pub use channel::{BridgeRequest, ChannelBridge};

use crate::{
    common::errors::BridgeError,
    protocol::{BridgeResponse, ExtensionMessage},
};

/// The page side of the privileged tab-mute channel.
#[async_trait]
pub trait TabBridge: Send + Sync {
    /// Sends a request and waits for the background's reply.
    async fn request(&self, message: ExtensionMessage) -> Result<BridgeResponse, BridgeError>;

    /// Fire-and-forget notice; delivery failures are ignored.
    fn notify(&self, message: ExtensionMessage);
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use parking_lot::Mutex;

    use super::*;

    /// Answers every request immediately and keeps a log of what was sent.
    pub(crate) struct RecordingBridge {
        pub sent: Mutex<Vec<ExtensionMessage>>,
        succeed: AtomicBool,
    }

    impl RecordingBridge {
        pub fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                succeed: AtomicBool::new(true),
            }
        }

        pub fn set_succeed(&self, succeed: bool) {
            self.succeed.store(succeed, Ordering::SeqCst);
        }

        pub fn requests(&self) -> Vec<ExtensionMessage> {
            self.sent
                .lock()
                .iter()
                .filter(|m| !matches!(m, ExtensionMessage::AdDetected { .. }))
                .cloned()
                .collect()
        }

        pub fn notices(&self) -> Vec<ExtensionMessage> {
            self.sent
                .lock()
                .iter()
                .filter(|m| matches!(m, ExtensionMessage::AdDetected { .. }))
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl TabBridge for RecordingBridge {
        async fn request(&self, message: ExtensionMessage) -> Result<BridgeResponse, BridgeError> {
            self.sent.lock().push(message);
            Ok(BridgeResponse {
                success: self.succeed.load(Ordering::SeqCst),
            })
        }

        fn notify(&self, message: ExtensionMessage) {
            self.sent.lock().push(message);
        }
    }
}
