pub mod messages;

pub use messages::{BridgeResponse, ExtensionMessage};
