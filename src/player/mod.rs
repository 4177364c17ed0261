//! Capability-probed access to third-party video player objects.

pub mod adapter;
pub mod capabilities;
pub mod object;
pub mod registry;
pub mod skip;

pub use adapter::{AdSignal, find_player_instances, is_player_ad, player_ad_signal};
pub use capabilities::Capabilities;
pub use object::{AdvertisingConfig, PlayerEvent, PlayerLibrary, PlayerObject, PlayerStatus};
pub use registry::{PlayerRegistry, RegisteredPlayer};
pub use skip::try_skip;
