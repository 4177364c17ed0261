use tracing::{debug, info};

use super::{capabilities::Capabilities, registry::RegisteredPlayer};
use crate::{
    configs::DetectionConfig,
    dom::{self, Dom},
};

/// Clicks the player's visible skip control once the ad passes its skip
/// offset. Returns whether a click was delivered.
pub fn try_skip(
    dom: &dyn Dom,
    config: &DetectionConfig,
    player: &RegisteredPlayer,
    position: f64,
) -> bool {
    if !config.auto_skip || !player.has(Capabilities::CONTAINER) {
        return false;
    }

    let skip_offset = if player.has(Capabilities::ADVERTISING) {
        player
            .object
            .advertising()
            .ok()
            .flatten()
            .and_then(|ad| ad.skip_offset)
    } else {
        None
    }
    .unwrap_or(config.default_skip_offset_secs);

    if position < skip_offset {
        return false;
    }

    let Some(container) = player.object.container().ok().flatten() else {
        return false;
    };

    let button = dom::descendants(dom, container).into_iter().find(|&node| {
        dom.class_name(node)
            .split_whitespace()
            .any(|class| class == "jw-skip")
            && dom.display(node) != "none"
    });

    match button.map(|node| dom.click(node)) {
        Some(Ok(())) => {
            info!("Skipped ad on {} at {:.1}s", player.handle, position);
            true
        }
        Some(Err(e)) => {
            debug!("Skip click on {} failed: {}", player.handle, e);
            false
        }
        None => false,
    }
}
