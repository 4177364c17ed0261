//! In-memory document used by the host-list tool and the test suites.

use std::collections::{BTreeMap, HashSet};

use parking_lot::RwLock;

use super::{Dom, NodeId, Rect, Tag};
use crate::common::errors::DomError;

#[derive(Debug, Default)]
struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    children: Vec<NodeId>,
    shadow: Vec<NodeId>,
    parent: Option<NodeId>,
    rect: Rect,
    text: String,
    current_src: Option<String>,
    display: String,
    muted: bool,
    paused: bool,
    clicks: u32,
}

#[derive(Debug, Default)]
struct Arena {
    nodes: Vec<Element>,
    /// Nodes whose property access throws (cross-origin frames).
    blocked: HashSet<NodeId>,
    /// Nodes whose `muted` setter throws.
    unmutable: HashSet<NodeId>,
}

impl Arena {
    fn get(&self, node: NodeId) -> Result<&Element, DomError> {
        self.nodes.get(node.0 as usize).ok_or(DomError::Detached)
    }

    fn get_mut(&mut self, node: NodeId) -> Result<&mut Element, DomError> {
        self.nodes.get_mut(node.0 as usize).ok_or(DomError::Detached)
    }

    fn readable(&self, node: NodeId) -> Result<&Element, DomError> {
        if self.blocked.contains(&node) {
            return Err(DomError::Blocked(format!("{}", node)));
        }
        self.get(node)
    }

    fn serialize(&self, node: NodeId, out: &mut String) {
        let Ok(element) = self.get(node) else {
            return;
        };
        out.push('<');
        out.push_str(&element.tag);
        for (name, value) in &element.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, value));
        }
        out.push('>');
        out.push_str(&element.text);
        for &child in &element.children {
            self.serialize(child, out);
        }
        out.push_str(&format!("</{}>", element.tag));
    }

    fn text_of(&self, node: NodeId, out: &mut String) {
        let Ok(element) = self.get(node) else {
            return;
        };
        out.push_str(&element.text);
        for &child in &element.children {
            self.text_of(child, out);
        }
    }
}

/// A mutable tree of elements with just enough behavior for the core:
/// attributes, geometry, media flags, shadow roots and failure injection.
#[derive(Debug)]
pub struct MemoryDom {
    arena: RwLock<Arena>,
    base_url: Option<String>,
    root: NodeId,
    body: NodeId,
}

impl MemoryDom {
    pub fn new(base_url: Option<&str>) -> Self {
        let mut arena = Arena::default();
        arena.nodes.push(Element {
            tag: "html".into(),
            ..Default::default()
        });
        arena.nodes.push(Element {
            tag: "body".into(),
            parent: Some(NodeId(0)),
            ..Default::default()
        });
        arena.nodes[0].children.push(NodeId(1));

        Self {
            arena: RwLock::new(arena),
            base_url: base_url.map(str::to_string),
            root: NodeId(0),
            body: NodeId(1),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Creates a detached element.
    pub fn create(&self, tag: &str) -> NodeId {
        let mut arena = self.arena.write();
        let id = NodeId(arena.nodes.len() as u32);
        arena.nodes.push(Element {
            tag: tag.to_ascii_lowercase(),
            paused: true,
            ..Default::default()
        });
        id
    }

    pub fn append(&self, parent: NodeId, child: NodeId) {
        let mut arena = self.arena.write();
        if let Ok(element) = arena.get_mut(child) {
            element.parent = Some(parent);
        }
        if let Ok(element) = arena.get_mut(parent) {
            element.children.push(child);
        }
    }

    pub fn append_new(&self, parent: NodeId, tag: &str) -> NodeId {
        let child = self.create(tag);
        self.append(parent, child);
        child
    }

    /// Appends `child` to the (open) shadow root of `host`.
    pub fn append_shadow(&self, host: NodeId, child: NodeId) {
        let mut arena = self.arena.write();
        if let Ok(element) = arena.get_mut(child) {
            element.parent = Some(host);
        }
        if let Ok(element) = arena.get_mut(host) {
            element.shadow.push(child);
        }
    }

    /// Detaches `node` (and its subtree) from its parent.
    pub fn remove(&self, node: NodeId) {
        let mut arena = self.arena.write();
        let Some(parent) = arena.get(node).ok().and_then(|e| e.parent) else {
            return;
        };
        if let Ok(element) = arena.get_mut(parent) {
            element.children.retain(|&c| c != node);
            element.shadow.retain(|&c| c != node);
        }
        if let Ok(element) = arena.get_mut(node) {
            element.parent = None;
        }
    }

    pub fn set_attr(&self, node: NodeId, name: &str, value: &str) {
        if let Ok(element) = self.arena.write().get_mut(node) {
            element.attributes.insert(name.to_string(), value.to_string());
        }
    }

    /// Sets both the `src` attribute and the resolved `currentSrc`.
    pub fn set_src(&self, node: NodeId, src: &str) {
        if let Ok(element) = self.arena.write().get_mut(node) {
            element.attributes.insert("src".into(), src.to_string());
            element.current_src = Some(src.to_string());
        }
    }

    pub fn set_rect(&self, node: NodeId, rect: Rect) {
        if let Ok(element) = self.arena.write().get_mut(node) {
            element.rect = rect;
        }
    }

    pub fn set_text(&self, node: NodeId, text: &str) {
        if let Ok(element) = self.arena.write().get_mut(node) {
            element.text = text.to_string();
        }
    }

    pub fn set_paused(&self, node: NodeId, paused: bool) {
        if let Ok(element) = self.arena.write().get_mut(node) {
            element.paused = paused;
        }
    }

    /// Simulates the user toggling mute by hand.
    pub fn user_set_muted(&self, node: NodeId, muted: bool) {
        if let Ok(element) = self.arena.write().get_mut(node) {
            element.muted = muted;
        }
    }

    /// Makes every property read on `node` throw.
    pub fn block(&self, node: NodeId) {
        self.arena.write().blocked.insert(node);
    }

    /// Makes the `muted` setter on `node` throw.
    pub fn make_unmutable(&self, node: NodeId) {
        self.arena.write().unmutable.insert(node);
    }

    pub fn clicks(&self, node: NodeId) -> u32 {
        self.arena.read().get(node).map(|e| e.clicks).unwrap_or(0)
    }
}

impl Dom for MemoryDom {
    fn root(&self) -> NodeId {
        self.root
    }

    fn base_url(&self) -> Option<String> {
        self.base_url.clone()
    }

    fn tag(&self, node: NodeId) -> Option<Tag> {
        self.arena.read().get(node).ok().map(|e| Tag::from_name(&e.tag))
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.read().get(node).ok().and_then(|e| e.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.arena
            .read()
            .get(node)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    fn shadow_children(&self, node: NodeId) -> Vec<NodeId> {
        self.arena
            .read()
            .get(node)
            .map(|e| e.shadow.clone())
            .unwrap_or_default()
    }

    fn is_connected(&self, node: NodeId) -> bool {
        let arena = self.arena.read();
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match arena.get(current).ok().and_then(|e| e.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let arena = self.arena.read();
        Ok(arena.readable(node)?.attributes.get(name).cloned())
    }

    fn current_src(&self, node: NodeId) -> Result<Option<String>, DomError> {
        let arena = self.arena.read();
        let element = arena.readable(node)?;
        Ok(element
            .current_src
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| element.attributes.get("src").cloned())
            .filter(|s| !s.is_empty()))
    }

    fn bounding_rect(&self, node: NodeId) -> Result<Rect, DomError> {
        let arena = self.arena.read();
        let element = arena.readable(node)?;
        // display:none elements have no box
        if element.display == "none" {
            return Ok(Rect::default());
        }
        Ok(element.rect)
    }

    fn markup(&self, node: NodeId) -> Result<String, DomError> {
        let arena = self.arena.read();
        let element = arena.readable(node)?;
        let mut out = element.text.clone();
        for &child in &element.children {
            arena.serialize(child, &mut out);
        }
        Ok(out)
    }

    fn text_content(&self, node: NodeId) -> Result<String, DomError> {
        let arena = self.arena.read();
        arena.readable(node)?;
        let mut out = String::new();
        arena.text_of(node, &mut out);
        Ok(out)
    }

    fn display(&self, node: NodeId) -> String {
        self.arena
            .read()
            .get(node)
            .map(|e| e.display.clone())
            .unwrap_or_default()
    }

    fn is_muted(&self, node: NodeId) -> bool {
        self.arena.read().get(node).map(|e| e.muted).unwrap_or(false)
    }

    fn is_paused(&self, node: NodeId) -> bool {
        self.arena.read().get(node).map(|e| e.paused).unwrap_or(true)
    }

    fn set_muted(&self, node: NodeId, muted: bool) -> Result<(), DomError> {
        let mut arena = self.arena.write();
        if arena.unmutable.contains(&node) {
            return Err(DomError::Rejected("muted setter threw".into()));
        }
        arena.get_mut(node)?.muted = muted;
        Ok(())
    }

    fn set_display(&self, node: NodeId, display: &str) -> Result<(), DomError> {
        self.arena.write().get_mut(node)?.display = display.to_string();
        Ok(())
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.arena
            .write()
            .get_mut(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_attribute(&self, node: NodeId, name: &str) -> Result<(), DomError> {
        self.arena.write().get_mut(node)?.attributes.remove(name);
        Ok(())
    }

    fn click(&self, node: NodeId) -> Result<(), DomError> {
        self.arena.write().get_mut(node)?.clicks += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_disconnects_subtree() {
        let dom = MemoryDom::new(None);
        let wrapper = dom.append_new(dom.body(), "div");
        let video = dom.append_new(wrapper, "video");
        assert!(dom.is_connected(video));

        dom.remove(wrapper);
        assert!(!dom.is_connected(video));
        assert!(dom.is_connected(dom.body()));
    }

    #[test]
    fn shadow_children_stay_out_of_light_tree() {
        let dom = MemoryDom::new(None);
        let host = dom.append_new(dom.body(), "custom-player");
        let video = dom.create("video");
        dom.append_shadow(host, video);

        assert!(dom.children(host).is_empty());
        assert_eq!(dom.shadow_children(host), vec![video]);
        assert!(dom.is_connected(video));
    }

    #[test]
    fn markup_serializes_descendants() {
        let dom = MemoryDom::new(None);
        let wrapper = dom.append_new(dom.body(), "div");
        let frame = dom.append_new(wrapper, "iframe");
        dom.set_src(frame, "https://googlesyndication.com/x");

        let markup = dom.markup(wrapper).unwrap();
        assert!(markup.contains("googlesyndication"));
        assert!(markup.starts_with("<iframe"));
    }

    #[test]
    fn blocked_nodes_throw_on_read() {
        let dom = MemoryDom::new(None);
        let frame = dom.append_new(dom.body(), "iframe");
        dom.block(frame);
        assert!(matches!(dom.attribute(frame, "src"), Err(DomError::Blocked(_))));
        assert!(!dom.has_attribute(frame, "src"));
    }
}
