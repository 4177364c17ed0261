use std::collections::HashMap;

use tracing::debug;

use crate::{
    detection::is_ad_iframe,
    dom::{Dom, NodeId},
    domains::AdDomains,
};

/// Attribute set on every iframe we hid.
pub const HIDDEN_MARKER: &str = "data-admute-hidden";

/// Ad iframes hidden on top of a video, keyed by iframe.
#[derive(Debug, Default)]
pub struct HiddenOverlays {
    owners: HashMap<NodeId, NodeId>,
}

impl HiddenOverlays {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hides `iframe` on behalf of `video`. Returns false if it was already
    /// hidden or the write failed.
    pub fn hide(&mut self, dom: &dyn Dom, iframe: NodeId, video: NodeId) -> bool {
        if self.owners.contains_key(&iframe) {
            return false;
        }
        if let Err(e) = dom.set_display(iframe, "none") {
            debug!("Could not hide overlay {}: {}", iframe, e);
            return false;
        }
        if let Err(e) = dom.set_attribute(iframe, HIDDEN_MARKER, "true") {
            debug!("Could not mark overlay {}: {}", iframe, e);
        }
        self.owners.insert(iframe, video);
        true
    }

    /// Iframes hidden for `video` that are still attached and still ads.
    pub fn active_for(&self, dom: &dyn Dom, domains: &AdDomains, video: NodeId) -> Vec<NodeId> {
        let mut active: Vec<NodeId> = self
            .owners
            .iter()
            .filter(|&(&iframe, &owner)| {
                owner == video && dom.is_connected(iframe) && is_ad_iframe(dom, domains, iframe)
            })
            .map(|(&iframe, _)| iframe)
            .collect();
        active.sort();
        active
    }

    /// Un-hides every iframe hidden for `video`. Returns how many were
    /// restored.
    pub fn restore_for(&mut self, dom: &dyn Dom, video: NodeId) -> usize {
        let mine: Vec<NodeId> = self
            .owners
            .iter()
            .filter(|&(_, &owner)| owner == video)
            .map(|(&iframe, _)| iframe)
            .collect();

        for &iframe in &mine {
            self.owners.remove(&iframe);
            if !dom.is_connected(iframe) {
                continue;
            }
            let shown = dom
                .set_display(iframe, "")
                .and_then(|_| dom.remove_attribute(iframe, HIDDEN_MARKER));
            if let Err(e) = shown {
                debug!("Could not restore overlay {}: {}", iframe, e);
            }
        }
        mine.len()
    }

    pub fn is_hidden(&self, iframe: NodeId) -> bool {
        self.owners.contains_key(&iframe)
    }

    /// Drops entries whose iframe or owning video left the document.
    pub fn sweep(&mut self, dom: &dyn Dom) -> usize {
        let before = self.owners.len();
        self.owners
            .retain(|&iframe, &mut video| dom.is_connected(iframe) && dom.is_connected(video));
        before - self.owners.len()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn clear(&mut self) {
        self.owners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    #[test]
    fn hide_and_restore_round() {
        let dom = MemoryDom::new(None);
        let domains = AdDomains::default();
        let video = dom.append_new(dom.body(), "video");
        let frame = dom.append_new(dom.body(), "iframe");
        dom.set_attr(frame, "src", "https://adnxs.com/overlay");

        let mut hidden = HiddenOverlays::new();
        assert!(hidden.hide(&dom, frame, video));
        assert!(!hidden.hide(&dom, frame, video));
        assert_eq!(dom.display(frame), "none");
        assert_eq!(dom.attribute(frame, HIDDEN_MARKER).unwrap().as_deref(), Some("true"));
        assert_eq!(hidden.active_for(&dom, &domains, video), vec![frame]);

        assert_eq!(hidden.restore_for(&dom, video), 1);
        assert_eq!(dom.display(frame), "");
        assert!(!dom.has_attribute(frame, HIDDEN_MARKER));
        assert!(hidden.is_empty());
    }

    #[test]
    fn removed_overlay_is_not_active() {
        let dom = MemoryDom::new(None);
        let domains = AdDomains::default();
        let video = dom.append_new(dom.body(), "video");
        let frame = dom.append_new(dom.body(), "iframe");
        dom.set_attr(frame, "src", "https://adnxs.com/overlay");

        let mut hidden = HiddenOverlays::new();
        hidden.hide(&dom, frame, video);
        dom.remove(frame);
        assert!(hidden.active_for(&dom, &domains, video).is_empty());
        assert_eq!(hidden.sweep(&dom), 1);
    }
}
