use crate::{
    detection::element::is_ad_iframe,
    dom::{Dom, NodeId, Tag, elements_by_tag},
    domains::AdDomains,
};

/// Ad iframes whose box intersects the video's box: ads drawn on top of a
/// real player instead of replacing its source.
pub fn find_overlay_ad_iframes(dom: &dyn Dom, domains: &AdDomains, video: NodeId) -> Vec<NodeId> {
    let video_rect = match dom.bounding_rect(video) {
        Ok(rect) => rect,
        Err(e) => {
            tracing::debug!("No geometry for {}: {}", video, e);
            return Vec::new();
        }
    };

    elements_by_tag(dom, &Tag::Iframe)
        .into_iter()
        .filter(|&iframe| is_ad_iframe(dom, domains, iframe))
        .filter(|&iframe| {
            dom.bounding_rect(iframe)
                .is_ok_and(|rect| !rect.is_empty() && rect.overlaps(&video_rect))
        })
        .collect()
}
