use std::sync::Arc;

use parking_lot::Mutex;

/// A shared component guarded by a synchronous mutex.
///
/// Guards are never held across an `.await`; every read of shared state
/// happens at callback entry.
pub type Shared<T> = Arc<Mutex<T>>;

/// A generic boxed error type.
pub type AnyError = Box<dyn std::error::Error + Send + Sync>;

/// A convenient Result alias returning `AnyError`.
pub type AnyResult<T> = std::result::Result<T, AnyError>;

/// Stable handle for a DOM node, issued by the `Dom` collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Stable handle for a registered player object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerHandle(pub u32);

impl std::fmt::Display for PlayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

/// Key of every per-candidate table (mute records, source tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CandidateKey {
    Node(NodeId),
    Player(PlayerHandle),
}

impl From<NodeId> for CandidateKey {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<PlayerHandle> for CandidateKey {
    fn from(handle: PlayerHandle) -> Self {
        Self::Player(handle)
    }
}

impl std::fmt::Display for CandidateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Node(id) => id.fmt(f),
            Self::Player(handle) => handle.fmt(f),
        }
    }
}
