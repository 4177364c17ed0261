pub mod base;
pub mod detection;
pub mod domains;
pub mod logging;
pub mod muting;

pub use base::*;
pub use detection::*;
pub use domains::*;
pub use logging::*;
pub use muting::*;
