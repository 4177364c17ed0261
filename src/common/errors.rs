use thiserror::Error;

/// Failure of a DOM read or write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node is no longer in the document")]
    Detached,
    /// Cross-origin or otherwise blocked property access.
    #[error("access blocked: {0}")]
    Blocked(String),
    #[error("operation not supported on this element")]
    Unsupported,
    /// The browser refused the write (e.g. volume change without a user gesture).
    #[error("rejected by the browser: {0}")]
    Rejected(String),
}

/// Failure while probing a third-party player object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("player does not expose `{0}`")]
    Unsupported(&'static str),
    #[error("player call threw: {0}")]
    Threw(String),
}

/// Failure fetching the remote host list.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("{0}")]
    Other(String),
}

/// Failure reading or writing the persisted domain cache.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a round-trip to the privileged background context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("background context is not reachable")]
    Disconnected,
    #[error("background context dropped the request")]
    Closed,
}
