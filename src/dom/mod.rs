//! DOM collaborator boundary.
//!
//! The core never touches a browser document directly: it reads tags,
//! attributes, geometry and markup through [`Dom`] and writes only `muted`,
//! inline `display` and its own marker attributes. Nodes are addressed by
//! [`NodeId`] handles that stay stable for the node's lifetime.

pub mod memory;

pub use memory::MemoryDom;

use url::Url;

pub use crate::common::types::NodeId;
use crate::common::errors::DomError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Video,
    Canvas,
    Iframe,
    Other(String),
}

impl Tag {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "video" => Self::Video,
            "canvas" => Self::Canvas,
            "iframe" => Self::Iframe,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Video => "video",
            Self::Canvas => "canvas",
            Self::Iframe => "iframe",
            Self::Other(name) => name,
        }
    }

    /// Tags the change driver treats as media candidates.
    pub fn is_media(&self) -> bool {
        matches!(self, Self::Video | Self::Canvas | Self::Iframe)
    }
}

/// Viewport-relative bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Axis-aligned intersection: true unless the two are disjoint on an axis.
    /// Touching edges count as overlapping.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(other.right < self.left
            || other.left > self.right
            || other.bottom < self.top
            || other.top > self.bottom)
    }
}

pub trait Dom: Send + Sync {
    /// The document element.
    fn root(&self) -> NodeId;

    /// Base URL used to resolve relative `src` values.
    fn base_url(&self) -> Option<String>;

    /// `None` once the node has been garbage collected by the host.
    fn tag(&self, node: NodeId) -> Option<Tag>;

    /// Parent element, or the shadow host for a shadow root's top-level children.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Light-DOM children in document order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Top-level children of the node's open shadow root, if any.
    fn shadow_children(&self, node: NodeId) -> Vec<NodeId>;

    fn is_connected(&self, node: NodeId) -> bool;

    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DomError>;

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        matches!(self.attribute(node, name), Ok(Some(_)))
    }

    fn class_name(&self, node: NodeId) -> String {
        self.attribute(node, "class").ok().flatten().unwrap_or_default()
    }

    fn element_id(&self, node: NodeId) -> String {
        self.attribute(node, "id").ok().flatten().unwrap_or_default()
    }

    /// The resolved media source (`currentSrc`, falling back to `src`).
    fn current_src(&self, node: NodeId) -> Result<Option<String>, DomError>;

    fn bounding_rect(&self, node: NodeId) -> Result<Rect, DomError>;

    /// Serialized inner markup.
    fn markup(&self, node: NodeId) -> Result<String, DomError>;

    fn text_content(&self, node: NodeId) -> Result<String, DomError>;

    /// Inline `style.display`, empty when unset.
    fn display(&self, node: NodeId) -> String;

    fn is_muted(&self, node: NodeId) -> bool;

    fn is_paused(&self, node: NodeId) -> bool;

    fn set_muted(&self, node: NodeId, muted: bool) -> Result<(), DomError>;

    fn set_display(&self, node: NodeId, display: &str) -> Result<(), DomError>;

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), DomError>;

    fn remove_attribute(&self, node: NodeId, name: &str) -> Result<(), DomError>;

    fn click(&self, node: NodeId) -> Result<(), DomError>;
}

/// Light-DOM descendants of `node` in document order, excluding `node`.
pub fn descendants(dom: &dyn Dom, node: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = dom.children(node).into_iter().rev().collect();
    while let Some(next) = stack.pop() {
        out.push(next);
        stack.extend(dom.children(next).into_iter().rev());
    }
    out
}

/// Every light-DOM element of the document, root first.
pub fn all_elements(dom: &dyn Dom) -> Vec<NodeId> {
    let root = dom.root();
    let mut out = vec![root];
    out.extend(descendants(dom, root));
    out
}

pub fn elements_by_tag(dom: &dyn Dom, tag: &Tag) -> Vec<NodeId> {
    all_elements(dom)
        .into_iter()
        .filter(|&node| dom.tag(node).as_ref() == Some(tag))
        .collect()
}

/// Nearest inclusive ancestor matching `pred`.
pub fn closest(
    dom: &dyn Dom,
    node: NodeId,
    mut pred: impl FnMut(NodeId) -> bool,
) -> Option<NodeId> {
    let mut current = Some(node);
    while let Some(candidate) = current {
        if pred(candidate) {
            return Some(candidate);
        }
        current = dom.parent(candidate);
    }
    None
}

/// Resolves a possibly relative URL against the document and returns its
/// lower-cased hostname. Unparseable or host-less URLs yield `None`.
pub fn resolve_host(dom: &dyn Dom, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(&dom.base_url()?).ok()?;
            base.join(raw).ok()?
        }
        Err(e) => {
            tracing::debug!("Unparseable media url {:?}: {}", raw, e);
            return None;
        }
    };

    parsed.host_str().map(|host| host.to_ascii_lowercase())
}
