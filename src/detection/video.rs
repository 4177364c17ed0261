use std::collections::HashSet;

use crate::{
    detection::element::src_is_ad_host,
    dom::{Dom, NodeId, Tag, closest},
    domains::AdDomains,
};

/// Markup fragments that give away an ad-rendering canvas container.
const CANVAS_AD_MARKERS: &[&str] = &["doubleclick", "googlesyndication"];

/// Path fragments of ad creatives served from first-party hosts.
const AD_SRC_MARKERS: &[&str] = &["web_video_ads"];

fn player_like_container(dom: &dyn Dom, node: NodeId) -> Option<NodeId> {
    closest(dom, node, |candidate| {
        let id = dom.element_id(candidate).to_ascii_lowercase();
        let class_name = dom.class_name(candidate).to_ascii_lowercase();
        ["player", "video"]
            .iter()
            .any(|needle| id.contains(needle) || class_name.contains(needle))
    })
}

/// A canvas counts as video when it sits inside a player/video container.
pub fn is_video_canvas(dom: &dyn Dom, node: NodeId) -> bool {
    dom.tag(node) == Some(Tag::Canvas) && player_like_container(dom, node).is_some()
}

/// Whether a video (or video-rendering canvas) is currently playing an ad.
pub fn is_video_ad(dom: &dyn Dom, domains: &AdDomains, node: NodeId) -> bool {
    match dom.tag(node) {
        Some(Tag::Canvas) => {
            let Some(container) = player_like_container(dom, node) else {
                return false;
            };
            match dom.markup(container) {
                Ok(markup) => CANVAS_AD_MARKERS.iter().any(|m| markup.contains(m)),
                Err(e) => {
                    tracing::debug!("Cannot read canvas container markup: {}", e);
                    false
                }
            }
        }
        Some(_) => src_is_ad_host(dom, domains, node) || src_has_ad_marker(dom, node),
        None => false,
    }
}

fn src_has_ad_marker(dom: &dyn Dom, node: NodeId) -> bool {
    match dom.current_src(node) {
        Ok(Some(src)) => AD_SRC_MARKERS.iter().any(|marker| src.contains(marker)),
        Ok(None) => false,
        Err(e) => {
            tracing::debug!("Cannot read media src on {}: {}", node, e);
            false
        }
    }
}

/// Walks the composed tree (light children and open shadow roots) in
/// document order.
fn composed_walk(dom: &dyn Dom, mut visit: impl FnMut(NodeId, bool)) {
    let mut stack = vec![(dom.root(), false)];
    while let Some((node, in_shadow)) = stack.pop() {
        visit(node, in_shadow);
        let light = dom.children(node).into_iter().map(|c| (c, in_shadow));
        let shadow = dom.shadow_children(node).into_iter().map(|c| (c, true));
        let mut next: Vec<(NodeId, bool)> = shadow.chain(light).collect();
        next.reverse();
        stack.extend(next);
    }
}

/// Videos that live inside (possibly nested) shadow roots.
pub fn find_shadow_videos(dom: &dyn Dom) -> Vec<NodeId> {
    let mut out = Vec::new();
    composed_walk(dom, |node, in_shadow| {
        if in_shadow && dom.tag(node) == Some(Tag::Video) {
            out.push(node);
        }
    });
    out
}

/// Every video candidate on the page: light and shadow-DOM videos first,
/// then canvases that render video. De-duplicated.
pub fn find_all_videos(dom: &dyn Dom) -> Vec<NodeId> {
    let mut videos = Vec::new();
    let mut canvases = Vec::new();
    composed_walk(dom, |node, _| match dom.tag(node) {
        Some(Tag::Video) => videos.push(node),
        Some(Tag::Canvas) => canvases.push(node),
        _ => {}
    });

    let mut seen = HashSet::new();
    videos
        .into_iter()
        .chain(canvases.into_iter().filter(|&c| is_video_canvas(dom, c)))
        .filter(|node| seen.insert(*node))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    #[test]
    fn finds_light_shadow_and_canvas_candidates() {
        let dom = MemoryDom::new(None);
        let light = dom.append_new(dom.body(), "video");

        let host = dom.append_new(dom.body(), "fancy-player");
        let inner = dom.create("div");
        dom.append_shadow(host, inner);
        let nested_host = dom.append_new(inner, "span");
        let deep = dom.create("video");
        dom.append_shadow(nested_host, deep);

        let wrapper = dom.append_new(dom.body(), "div");
        dom.set_attr(wrapper, "class", "VideoPlayer");
        let canvas = dom.append_new(wrapper, "canvas");
        let stray_canvas = dom.append_new(dom.body(), "canvas");

        let all = find_all_videos(&dom);
        assert_eq!(all, vec![light, deep, canvas]);
        assert!(!all.contains(&stray_canvas));
        assert_eq!(find_shadow_videos(&dom), vec![deep]);
    }

    #[test]
    fn canvas_ad_follows_container_markup() {
        let dom = MemoryDom::new(None);
        let domains = AdDomains::default();
        let wrapper = dom.append_new(dom.body(), "div");
        dom.set_attr(wrapper, "id", "main-player");
        let canvas = dom.append_new(wrapper, "canvas");
        assert!(!is_video_ad(&dom, &domains, canvas));

        let tracker = dom.append_new(wrapper, "img");
        dom.set_attr(tracker, "src", "https://ad.doubleclick.net/pixel");
        assert!(is_video_ad(&dom, &domains, canvas));
    }

    #[test]
    fn first_party_ad_path_marks_video() {
        let dom = MemoryDom::new(Some("https://www.dailymotion.com/video/x1"));
        let domains = AdDomains::default();
        let video = dom.append_new(dom.body(), "video");

        dom.set_src(video, "https://www.dailymotion.com/cdn/web_video_ads/preroll.mp4");
        assert!(is_video_ad(&dom, &domains, video));

        dom.set_src(video, "https://www.dailymotion.com/cdn/manifest/video/x1.m3u8");
        assert!(!is_video_ad(&dom, &domains, video));
    }

    #[test]
    fn video_without_source_is_not_an_ad() {
        let dom = MemoryDom::new(None);
        let domains = AdDomains::default();
        let video = dom.append_new(dom.body(), "video");
        assert!(!is_video_ad(&dom, &domains, video));
    }
}
