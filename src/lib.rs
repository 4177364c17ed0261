pub mod bridge;
pub mod common;
pub mod configs;
pub mod context;
pub mod detection;
pub mod dom;
pub mod domains;
pub mod driver;
pub mod mute;
pub mod player;
pub mod protocol;

pub use context::PageContext;
pub use driver::PageDriver;
pub use mute::MuteCoordinator;
