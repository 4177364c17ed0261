//! Mute ownership: who muted what, why, and how to undo it.
//!
//! Every candidate cycles between unmuted content and muted-by-us. Only a
//! mute recorded here is ever reversed, so a mute the user applied is never
//! undone. Tab-level mutes carry a reason tag and are reversed only for the
//! same tag.

pub mod coordinator;
pub mod gesture;
pub mod overlay;
pub mod record;
pub mod tab;
pub mod tracker;

pub use coordinator::{MuteCoordinator, MuteOutcome};
pub use gesture::{GestureGate, PendingRestore};
pub use overlay::{HIDDEN_MARKER, HiddenOverlays};
pub use record::{MutePath, MuteReason, MuteRecord, MuteRecords};
pub use tab::{TabMuteState, TabMuter, TabOutcome};
pub use tracker::{SourceChange, SourceTracker};
