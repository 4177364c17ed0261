use std::sync::Arc;

use super::{capabilities::Capabilities, object::PlayerObject};
use crate::common::types::PlayerHandle;

pub struct RegisteredPlayer {
    pub handle: PlayerHandle,
    pub object: Arc<dyn PlayerObject>,
    pub capabilities: Capabilities,
}

impl RegisteredPlayer {
    pub fn has(&self, capability: Capabilities) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Discovered player objects, de-duplicated by object identity.
///
/// Page-scoped: cleared on navigation.
#[derive(Default)]
pub struct PlayerRegistry {
    entries: Vec<RegisteredPlayer>,
    next_handle: u32,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `object` unless it is already known. Returns its handle and
    /// whether it was new.
    pub fn register(&mut self, object: Arc<dyn PlayerObject>) -> (PlayerHandle, bool) {
        if let Some(existing) = self
            .entries
            .iter()
            .find(|entry| std::ptr::addr_eq(Arc::as_ptr(&entry.object), Arc::as_ptr(&object)))
        {
            return (existing.handle, false);
        }

        let handle = PlayerHandle(self.next_handle);
        self.next_handle += 1;
        let capabilities = Capabilities::probe(object.as_ref());
        tracing::debug!("Registered {} with capabilities {:?}", handle, capabilities);
        self.entries.push(RegisteredPlayer {
            handle,
            object,
            capabilities,
        });
        (handle, true)
    }

    pub fn get(&self, handle: PlayerHandle) -> Option<&RegisteredPlayer> {
        self.entries.iter().find(|entry| entry.handle == handle)
    }

    pub fn handles(&self) -> Vec<PlayerHandle> {
        self.entries.iter().map(|entry| entry.handle).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
