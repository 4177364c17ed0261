use std::collections::VecDeque;

use crate::common::types::PlayerHandle;

/// Audio restore that browsers only allow after a user gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingRestore {
    Player { handle: PlayerHandle, volume: f64 },
    Tab { reason: String },
}

/// One-shot gate opened by the first qualifying user gesture.
///
/// Restores queue until then and run immediately afterwards. If no gesture
/// ever arrives the queue is never flushed; that is accepted behaviour.
#[derive(Debug, Default)]
pub struct GestureGate {
    opened: bool,
    pending: VecDeque<PendingRestore>,
}

impl GestureGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// Queues `restore`, or hands it back when the gate is already open.
    pub fn defer(&mut self, restore: PendingRestore) -> Option<PendingRestore> {
        if self.opened {
            return Some(restore);
        }
        if !self.pending.contains(&restore) {
            self.pending.push_back(restore);
        }
        None
    }

    /// Opens the gate and drains the queue. Later calls return nothing.
    pub fn open(&mut self) -> Vec<PendingRestore> {
        self.opened = true;
        self.pending.drain(..).collect()
    }

    /// Drops queued restores matching `pred`.
    pub fn cancel(&mut self, mut pred: impl FnMut(&PendingRestore) -> bool) {
        self.pending.retain(|restore| !pred(restore));
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Closes the gate again for a new page.
    pub fn reset(&mut self) {
        self.opened = false;
        self.pending.clear();
    }
}
