//! Main-content vs. side-content placement of videos.
//!
//! Pages often carry several videos: the one the user came for, plus
//! previews, sidebar promos and ad slots. The main content video is the
//! first one that sits under a content-looking container and not under a
//! side-looking one.

use crate::dom::{self, Dom, NodeId, Tag};

const MAIN_CONTENT_TAGS: &[&str] = &["main", "article", "section"];

const MAIN_CONTENT_INDICATORS: &[&str] = &[
    "main", "content", "primary", "center", "middle", "watch", "player", "video", "stream",
    "media", "container", "wrapper", "body", "article", "playback", "viewer", "theatre",
    "theater", "fullscreen", "cinema", "embed",
];

const SIDE_CONTENT_TAGS: &[&str] = &["aside", "nav", "header", "footer"];

const SIDE_CONTENT_INDICATORS: &[&str] = &[
    "sidebar", "aside", "nav", "menu", "header", "footer", "advertisement", "ad-", "ads",
    "social", "share", "comment", "related", "recommendation", "widget", "banner", "promo",
    "adcolumn", "adspace", "thumbnail", "preview", "miniature", "small", "secondary",
    "auxiliary", "complementary", "extra", "sponsored", "promoted", "commercial", "marketing",
    "overlay", "popup", "modal", "tooltip", "notification", "breadcrumb", "pagination",
    "filter", "sort", "tabs", "accordion", "carousel", "slider", "meta", "info", "details",
    "description", "caption", "toolbar", "controls", "settings", "options",
];

const SIDE_CONTENT_ATTRIBUTES: &[&str] = &["data-ad", "data-advertisement", "data-sponsored"];

/// Side checks only look this many levels up, the video included.
const SIDE_CONTENT_DEPTH: usize = 3;

/// Videos smaller than this are previews or thumbnails.
const MIN_MAIN_WIDTH: f64 = 200.0;
const MIN_MAIN_HEIGHT: f64 = 150.0;

/// Inclusive ancestors of `node`, stopping below `<body>`.
fn ancestors(dom: &dyn Dom, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(Some(node), move |&current| dom.parent(current))
        .take_while(move |&current| !matches!(dom.tag(current), Some(Tag::Other(ref name)) if name == "body"))
}

fn named_like(dom: &dyn Dom, node: NodeId, indicators: &[&str]) -> bool {
    let id = dom.element_id(node).to_ascii_lowercase();
    let class_name = dom.class_name(node).to_ascii_lowercase();
    indicators
        .iter()
        .any(|needle| id.contains(needle) || class_name.contains(needle))
}

fn tag_in(dom: &dyn Dom, node: NodeId, tags: &[&str]) -> bool {
    dom.tag(node).is_some_and(|tag| tags.contains(&tag.name()))
}

pub fn is_main_content(dom: &dyn Dom, node: NodeId) -> bool {
    ancestors(dom, node).any(|current| {
        tag_in(dom, current, MAIN_CONTENT_TAGS) || named_like(dom, current, MAIN_CONTENT_INDICATORS)
    })
}

pub fn is_side_content(dom: &dyn Dom, node: NodeId) -> bool {
    ancestors(dom, node).take(SIDE_CONTENT_DEPTH).any(|current| {
        if tag_in(dom, current, SIDE_CONTENT_TAGS) || named_like(dom, current, SIDE_CONTENT_INDICATORS) {
            return true;
        }
        if SIDE_CONTENT_ATTRIBUTES
            .iter()
            .any(|attribute| dom.has_attribute(current, attribute))
        {
            return true;
        }
        dom.tag(current) == Some(Tag::Video)
            && dom.bounding_rect(current).is_ok_and(|rect| {
                rect.width() < MIN_MAIN_WIDTH || rect.height() < MIN_MAIN_HEIGHT
            })
    })
}

/// The first light-DOM video in document order that reads as main content.
pub fn main_content_video(dom: &dyn Dom) -> Option<NodeId> {
    dom::elements_by_tag(dom, &Tag::Video)
        .into_iter()
        .find(|&video| !is_side_content(dom, video) && is_main_content(dom, video))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, Rect};

    fn sized_video(dom: &MemoryDom, parent: NodeId, width: f64, height: f64) -> NodeId {
        let video = dom.append_new(parent, "video");
        dom.set_rect(video, Rect::new(0.0, 0.0, width, height));
        video
    }

    #[test]
    fn picks_player_video_over_sidebar_and_thumbnail() {
        let dom = MemoryDom::new(None);

        let sidebar = dom.append_new(dom.body(), "div");
        dom.set_attr(sidebar, "class", "right-sidebar");
        let promo = sized_video(&dom, sidebar, 640.0, 360.0);

        let player = dom.append_new(dom.body(), "div");
        dom.set_attr(player, "id", "watch-player");
        let thumb = sized_video(&dom, player, 160.0, 90.0);
        let main = sized_video(&dom, player, 1280.0, 720.0);

        assert!(is_side_content(&dom, promo));
        assert!(is_side_content(&dom, thumb));
        assert!(!is_side_content(&dom, main));
        assert_eq!(main_content_video(&dom), Some(main));
    }

    #[test]
    fn semantic_tags_decide_placement() {
        let dom = MemoryDom::new(None);
        let aside = dom.append_new(dom.body(), "aside");
        let side = sized_video(&dom, aside, 640.0, 360.0);

        let article = dom.append_new(dom.body(), "article");
        let plain = dom.append_new(article, "div");
        let main = sized_video(&dom, plain, 640.0, 360.0);

        assert!(is_side_content(&dom, side));
        assert!(is_main_content(&dom, main));
        assert_eq!(main_content_video(&dom), Some(main));
    }

    #[test]
    fn side_check_stops_three_levels_up() {
        let dom = MemoryDom::new(None);
        let nav = dom.append_new(dom.body(), "nav");
        let outer = dom.append_new(nav, "div");
        dom.set_attr(outer, "class", "stage");
        let inner = dom.append_new(outer, "div");
        let wrapper = dom.append_new(inner, "div");
        let video = sized_video(&dom, wrapper, 640.0, 360.0);

        assert!(!is_side_content(&dom, video));
        assert!(!is_main_content(&dom, video));
        assert_eq!(main_content_video(&dom), None);
    }

    #[test]
    fn sponsored_attribute_marks_side_content() {
        let dom = MemoryDom::new(None);
        let slot = dom.append_new(dom.body(), "div");
        dom.set_attr(slot, "class", "video-wrapper");
        dom.set_attr(slot, "data-sponsored", "");
        let video = sized_video(&dom, slot, 640.0, 360.0);

        assert!(is_main_content(&dom, video));
        assert!(is_side_content(&dom, video));
        assert_eq!(main_content_video(&dom), None);
    }
}
