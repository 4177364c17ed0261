use std::collections::HashMap;

use crate::dom::{Dom, NodeId};

/// Media nodes that already have event listeners attached.
#[derive(Debug, Default)]
pub struct ListenerTable {
    registered: HashMap<NodeId, bool>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `node` as registered. Returns true only the first time, which
    /// is when the caller attaches its listeners.
    pub fn register(&mut self, node: NodeId) -> bool {
        let slot = self.registered.entry(node).or_insert(false);
        if *slot {
            return false;
        }
        *slot = true;
        true
    }

    pub fn is_registered(&self, node: NodeId) -> bool {
        self.registered.get(&node).copied().unwrap_or(false)
    }

    pub fn forget(&mut self, node: NodeId) {
        self.registered.remove(&node);
    }

    /// Drops nodes that left the document.
    pub fn sweep(&mut self, dom: &dyn Dom) -> usize {
        let before = self.registered.len();
        self.registered.retain(|&node, _| dom.is_connected(node));
        before - self.registered.len()
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    pub fn clear(&mut self) {
        self.registered.clear();
    }
}
