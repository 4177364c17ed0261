use std::sync::Arc;

use tracing::{debug, trace};

use super::{
    capabilities::Capabilities,
    object::{PlayerLibrary, PlayerObject},
    registry::RegisteredPlayer,
};
use crate::{
    configs::DetectionConfig,
    dom::{self, Dom, NodeId, Tag},
    domains::AdDomains,
};

/// Id fragments of known player widgets.
pub const PLAYER_ID_PATTERNS: &[&str] = &[
    "jwplayer",
    "jw-player",
    "jw_player",
    "watching-player",
    "video-player",
    "media-player",
    "stream-player",
    "player-container",
    "player-wrapper",
    "player-placeholder",
    "player-holder",
    "player-element",
    "player-target",
    "player-mount",
    "player-root",
];

/// Class fragments of known player widgets, compared case-insensitively.
pub const PLAYER_CLASS_PATTERNS: &[&str] = &[
    "jwplayer",
    "jw-player",
    "jw_player",
    "topplayer",
    "videoplayer",
    "mediaplayer",
    "streamplayer",
    "player-container",
    "player-wrapper",
    "player-placeholder",
    "player-holder",
    "player-component",
    "video-container",
    "media-container",
    "stream-container",
];

pub const PLAYER_DATA_ATTRIBUTES: &[&str] = &[
    "data-jwplayer",
    "data-jw-player",
    "data-player",
    "data-video-player",
    "data-media-player",
    "data-player-id",
    "data-player-config",
];

/// Class fragments of ad chrome rendered inside a player container.
const AD_CHROME_CLASSES: &[&str] = &[
    "jw-ad",
    "jw-advertising",
    "ad-",
    "advertisement",
    "jw-skip",
    "jw-ad-container",
    "jw-overlay-ad",
];

const AD_CHROME_TEXT: &[&str] = &["advertisement", "sponsored", "skip ad"];

/// Pre-rolls are assumed to be detected within their first seconds.
const SHORT_AD_MAX_POSITION_SECS: f64 = 5.0;

/// Which probe classified a player as showing an ad.
#[derive(Debug, Clone, PartialEq)]
pub enum AdSignal {
    AdBlockFlag,
    PlaylistHost(String),
    AdvertisingConfig,
    ContainerMarkup,
    ContainerText,
    ShortPreroll,
}

/// Whether `node` looks like a player widget by its id, class or data
/// attributes.
pub fn is_player_container(dom: &dyn Dom, node: NodeId) -> bool {
    let id = dom.element_id(node).to_ascii_lowercase();
    if !id.is_empty() && PLAYER_ID_PATTERNS.iter().any(|p| id.contains(p)) {
        return true;
    }

    let class_name = dom.class_name(node).to_ascii_lowercase();
    if PLAYER_CLASS_PATTERNS.iter().any(|p| class_name.contains(p)) {
        return true;
    }

    if PLAYER_DATA_ATTRIBUTES
        .iter()
        .any(|attr| dom.has_attribute(node, attr))
    {
        return true;
    }

    looks_like_player_div(dom, node, &id, &class_name)
}

/// A sizeable `div` named like a player that also carries video-related
/// content.
fn looks_like_player_div(dom: &dyn Dom, node: NodeId, id: &str, class_name: &str) -> bool {
    if !matches!(dom.tag(node), Some(Tag::Other(ref name)) if name == "div") {
        return false;
    }
    if !id.contains("player") && !class_name.contains("player") {
        return false;
    }

    let big_enough = dom
        .bounding_rect(node)
        .is_ok_and(|rect| rect.width() > 200.0 && rect.height() > 150.0);
    if !big_enough {
        return false;
    }

    let named_for_video = ["video", "media", "stream", "watch"]
        .iter()
        .any(|word| id.contains(word) || class_name.contains(word));

    named_for_video
        || dom::descendants(dom, node)
            .into_iter()
            .any(|child| matches!(dom.tag(child), Some(Tag::Video | Tag::Canvas)))
}

pub fn find_player_containers(dom: &dyn Dom) -> Vec<NodeId> {
    dom::all_elements(dom)
        .into_iter()
        .filter(|&node| is_player_container(dom, node))
        .collect()
}

/// Discovers player objects on the page.
///
/// The library's own instance list comes first, then its default instance,
/// then every widget-like container resolved by id. Results are
/// de-duplicated by identity.
pub fn find_player_instances(
    library: Option<&dyn PlayerLibrary>,
    dom: &dyn Dom,
) -> Vec<Arc<dyn PlayerObject>> {
    let Some(library) = library else {
        return Vec::new();
    };

    let mut found: Vec<Arc<dyn PlayerObject>> = Vec::new();
    let mut push = |player: Arc<dyn PlayerObject>| {
        if !found
            .iter()
            .any(|known| std::ptr::addr_eq(Arc::as_ptr(known), Arc::as_ptr(&player)))
        {
            found.push(player);
        }
    };

    if let Some(all) = library.all_players() {
        all.into_iter().for_each(&mut push);
    }

    if let Some(default) = library.default_player() {
        if default.exposes(Capabilities::CONTAINER) {
            push(default);
        }
    }

    for container in find_player_containers(dom) {
        let id = dom.element_id(container);
        if id.is_empty() {
            continue;
        }
        match library.player_by_id(&id) {
            Ok(Some(player))
                if player.exposes(Capabilities::CONTAINER)
                    && player.exposes(Capabilities::EVENTS) =>
            {
                trace!("Resolved player from container #{}", id);
                push(player);
            }
            Ok(_) => {}
            Err(e) => debug!("Player lookup for #{} failed: {}", id, e),
        }
    }

    found
}

/// Runs every ad probe the player supports, in order, and returns the first
/// positive one.
///
/// A missing capability or a throwing call is "unknown" and falls through to
/// the next probe.
pub fn player_ad_signal(
    dom: &dyn Dom,
    domains: &AdDomains,
    config: &DetectionConfig,
    player: &RegisteredPlayer,
) -> Option<AdSignal> {
    let object = player.object.as_ref();

    if player.has(Capabilities::AD_BLOCK) {
        match object.ad_block() {
            Ok(true) => return Some(AdSignal::AdBlockFlag),
            Ok(false) => {}
            Err(e) => debug!("{}: ad block probe failed: {}", player.handle, e),
        }
    }

    if player.has(Capabilities::PLAYLIST_ITEM) {
        match object.playlist_item_file() {
            Ok(Some(file)) => {
                if let Some(host) = dom::resolve_host(dom, &file) {
                    if domains.is_ad_domain(&host) {
                        return Some(AdSignal::PlaylistHost(host));
                    }
                }
            }
            Ok(None) => {}
            Err(e) => debug!("{}: playlist probe failed: {}", player.handle, e),
        }
    }

    if player.has(Capabilities::ADVERTISING) {
        match object.advertising() {
            Ok(Some(_)) => return Some(AdSignal::AdvertisingConfig),
            Ok(None) => {}
            Err(e) => debug!("{}: advertising probe failed: {}", player.handle, e),
        }
    }

    let container = if player.has(Capabilities::CONTAINER) {
        object.container().ok().flatten()
    } else {
        None
    };

    if let Some(container) = container.filter(|_| player.has(Capabilities::EVENTS)) {
        if let Some(signal) = scan_container(dom, container) {
            return Some(signal);
        }
    }

    if player.has(Capabilities::STATE | Capabilities::TIMING) {
        if let Some(container) = container {
            if is_short_preroll(dom, config, object, container) {
                return Some(AdSignal::ShortPreroll);
            }
        }
    }

    None
}

pub fn is_player_ad(
    dom: &dyn Dom,
    domains: &AdDomains,
    config: &DetectionConfig,
    player: &RegisteredPlayer,
) -> bool {
    match player_ad_signal(dom, domains, config, player) {
        Some(signal) => {
            debug!("{} is showing an ad ({:?})", player.handle, signal);
            true
        }
        None => false,
    }
}

fn scan_container(dom: &dyn Dom, container: NodeId) -> Option<AdSignal> {
    let styled = dom::descendants(dom, container).into_iter().any(|node| {
        let class_name = dom.class_name(node).to_ascii_lowercase();
        AD_CHROME_CLASSES.iter().any(|c| class_name.contains(c))
            || dom
                .element_id(node)
                .to_ascii_lowercase()
                .contains("advertisement")
    });
    if styled {
        return Some(AdSignal::ContainerMarkup);
    }

    let text = dom.text_content(container).ok()?.to_ascii_lowercase();
    AD_CHROME_TEXT
        .iter()
        .any(|needle| text.contains(needle))
        .then_some(AdSignal::ContainerText)
}

/// Short item playing from its start with a skip control in view.
fn is_short_preroll(
    dom: &dyn Dom,
    config: &DetectionConfig,
    object: &dyn PlayerObject,
    container: NodeId,
) -> bool {
    if !object.state().is_ok_and(|state| state.is_active()) {
        return false;
    }

    let position = object.position().unwrap_or(0.0);
    let duration = object.duration().unwrap_or(0.0);
    if duration <= 0.0 || duration >= config.short_ad_max_secs {
        return false;
    }
    if position >= SHORT_AD_MAX_POSITION_SECS {
        return false;
    }

    dom::descendants(dom, container)
        .into_iter()
        .any(|node| dom.class_name(node).to_ascii_lowercase().contains("skip"))
}
