//! Heuristic ad classification of DOM elements.
//!
//! Everything here is best-effort. Class names that merely look like ad
//! markup produce false positives, and ads served from unknown hosts
//! produce false negatives; neither is treated as an error. Any failed
//! probe (unparseable URL, blocked cross-origin read) counts as "not an ad"
//! for that probe only.

pub mod element;
pub mod overlay;
pub mod placement;
pub mod video;

pub use element::{AD_CLASS_INDICATORS, AD_DATA_ATTRIBUTES, is_ad, is_ad_iframe};
pub use overlay::find_overlay_ad_iframes;
pub use placement::{is_main_content, is_side_content, main_content_video};
pub use video::{find_all_videos, find_shadow_videos, is_video_ad, is_video_canvas};
