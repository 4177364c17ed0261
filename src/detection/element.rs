use tracing::debug;

use crate::{
    dom::{Dom, NodeId, Tag, resolve_host},
    domains::AdDomains,
};

/// Lower-case class-name fragments that mark ad containers.
pub const AD_CLASS_INDICATORS: &[&str] = &[
    "advertisement",
    "advert",
    "ad-container",
    "ad-wrapper",
    "ad-unit",
    "ad-slot",
    "ad-banner",
    "ad-overlay",
    "ad-popup",
    "advertisement-container",
    "advertisement-wrapper",
    "advertisement-unit",
    "advertisement-slot",
    "advertisement-banner",
    "advertisement-overlay",
    "advertisement-popup",
];

/// Boolean data attributes that mark ad containers.
pub const AD_DATA_ATTRIBUTES: &[&str] = &[
    "data-ad",
    "data-advertisement",
    "data-ad-unit",
    "data-ad-overlay",
];

/// Whether `node` looks like advertising content.
pub fn is_ad(dom: &dyn Dom, domains: &AdDomains, node: NodeId) -> bool {
    match dom.tag(node) {
        None => return false,
        Some(Tag::Video) => {
            if src_is_ad_host(dom, domains, node) {
                return true;
            }
        }
        Some(Tag::Iframe) => {
            if matches!(dom.attribute(node, "src"), Ok(Some(ref src)) if !src.is_empty()) {
                return is_ad_iframe(dom, domains, node);
            }
        }
        Some(_) => {}
    }

    let class_name = dom.class_name(node).to_ascii_lowercase();
    if AD_CLASS_INDICATORS
        .iter()
        .any(|indicator| class_name.contains(indicator))
    {
        return true;
    }

    AD_DATA_ATTRIBUTES
        .iter()
        .any(|attr| dom.has_attribute(node, attr))
}

/// Whether an iframe's `src` points at an ad host.
pub fn is_ad_iframe(dom: &dyn Dom, domains: &AdDomains, node: NodeId) -> bool {
    let src = match dom.attribute(node, "src") {
        Ok(Some(src)) if !src.is_empty() => src,
        Ok(_) => return false,
        Err(e) => {
            debug!("Cannot read iframe src on {}: {}", node, e);
            return false;
        }
    };

    resolve_host(dom, &src).is_some_and(|host| domains.is_ad_domain(&host))
}

pub(crate) fn src_is_ad_host(dom: &dyn Dom, domains: &AdDomains, node: NodeId) -> bool {
    match dom.current_src(node) {
        Ok(Some(src)) => resolve_host(dom, &src).is_some_and(|host| domains.is_ad_domain(&host)),
        Ok(None) => false,
        Err(e) => {
            debug!("Cannot read media src on {}: {}", node, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    fn setup() -> (MemoryDom, AdDomains) {
        (
            MemoryDom::new(Some("https://content.example/page")),
            AdDomains::default(),
        )
    }

    #[test]
    fn video_on_ad_host_is_ad() {
        let (dom, domains) = setup();
        let video = dom.append_new(dom.body(), "video");
        dom.set_src(video, "https://doubleclick.net/ad.mp4");
        assert!(is_ad(&dom, &domains, video));

        dom.set_src(video, "https://content.example/video.mp4");
        assert!(!is_ad(&dom, &domains, video));
    }

    #[test]
    fn iframe_delegates_to_host_check() {
        let (dom, domains) = setup();
        let frame = dom.append_new(dom.body(), "iframe");
        dom.set_attr(frame, "src", "https://ads.taboola.com/widget");
        assert!(is_ad(&dom, &domains, frame));

        // a sourced iframe on a clean host is judged by its src alone
        let clean = dom.append_new(dom.body(), "iframe");
        dom.set_attr(clean, "src", "https://content.example/embed");
        dom.set_attr(clean, "class", "ad-banner");
        assert!(!is_ad(&dom, &domains, clean));
    }

    #[test]
    fn class_and_data_attributes_mark_containers() {
        let (dom, domains) = setup();
        let banner = dom.append_new(dom.body(), "div");
        dom.set_attr(banner, "class", "Sidebar AD-Banner");
        assert!(is_ad(&dom, &domains, banner));

        let slot = dom.append_new(dom.body(), "div");
        dom.set_attr(slot, "data-ad-unit", "");
        assert!(is_ad(&dom, &domains, slot));

        let plain = dom.append_new(dom.body(), "div");
        dom.set_attr(plain, "class", "article-body");
        assert!(!is_ad(&dom, &domains, plain));
    }

    #[test]
    fn blocked_iframe_is_not_an_ad() {
        let (dom, domains) = setup();
        let frame = dom.append_new(dom.body(), "iframe");
        dom.set_attr(frame, "src", "https://doubleclick.net/x");
        dom.block(frame);
        assert!(!is_ad_iframe(&dom, &domains, frame));
        assert!(!is_ad(&dom, &domains, frame));
    }

    #[test]
    fn unparseable_src_is_not_an_ad() {
        let (dom, domains) = setup();
        let frame = dom.append_new(dom.body(), "iframe");
        dom.set_attr(frame, "src", "http://[::1");
        assert!(!is_ad_iframe(&dom, &domains, frame));
    }
}
