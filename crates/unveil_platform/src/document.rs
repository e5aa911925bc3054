//! Document abstraction
//!
//! The animation core never touches a real DOM. Everything it needs from the
//! page (selector queries, attributes, classes, inline styles, geometry,
//! intersection observation and a handful of window-level queries) goes
//! through the [`Document`] trait. A browser binding implements it over the
//! live DOM; `unveil_platform_headless` implements it in memory.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::geometry::{Rect, Size};

/// Opaque handle to a node owned by a [`Document`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Reconstruct from raw u64
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Convert to raw u64 for storage in foreign handles
    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

/// Shared handle to the page document
///
/// Everything runs on the page's main thread, so the handle is `Rc<RefCell<_>>`.
/// Tween callbacks capture a clone to write text or navigate on completion.
pub type SharedDocument = Rc<RefCell<dyn Document>>;

/// Structural content used to replace an element's children
///
/// Used by the text-splitting presets: a word becomes a clipping span that
/// wraps an inner span which is then translated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fragment {
    /// A plain text node
    Text(String),
    /// An inline-block span
    Span {
        /// Optional class name
        class: Option<String>,
        /// Clip overflowing content (`overflow: hidden`)
        clip: bool,
        /// Child content
        children: Vec<Fragment>,
    },
}

impl Fragment {
    /// Plain text node
    pub fn text(text: impl Into<String>) -> Self {
        Fragment::Text(text.into())
    }

    /// Inline span with children
    pub fn span(class: Option<&str>, clip: bool, children: Vec<Fragment>) -> Self {
        Fragment::Span {
            class: class.map(str::to_string),
            clip,
            children,
        }
    }

    /// Concatenated text of this fragment
    pub fn text_content(&self) -> String {
        match self {
            Fragment::Text(text) => text.clone(),
            Fragment::Span { children, .. } => children.iter().map(|c| c.text_content()).collect(),
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Text(text) => f.write_str(text),
            Fragment::Span {
                class,
                clip,
                children,
            } => {
                f.write_str("<span")?;
                if let Some(class) = class {
                    write!(f, " class=\"{}\"", class)?;
                }
                if *clip {
                    f.write_str(" style=\"display: inline-block; overflow: hidden;\">")?;
                } else {
                    f.write_str(" style=\"display: inline-block;\">")?;
                }
                for child in children {
                    write!(f, "{}", child)?;
                }
                f.write_str("</span>")
            }
        }
    }
}

/// Intersection observer configuration
///
/// Mirrors the browser primitive: the root is the viewport shrunk (negative
/// margin) or grown (positive margin) at the bottom edge by a fraction of the
/// viewport height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverOptions {
    /// Bottom root margin as a fraction of viewport height (e.g. `-0.2`)
    pub bottom_margin: f32,
}

impl ObserverOptions {
    /// Observer whose root ends at `threshold` of the viewport height
    ///
    /// A threshold of 0.8 yields a bottom margin of -20%.
    pub fn for_threshold(threshold: f32) -> Self {
        Self {
            bottom_margin: -(1.0 - threshold),
        }
    }
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self { bottom_margin: 0.0 }
    }
}

/// A change in an observed element's intersection with the observer root
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionRecord {
    pub node: NodeId,
    /// The observer that produced the record
    pub options: ObserverOptions,
    pub is_intersecting: bool,
}

/// Page document and window access
///
/// Lookups return `Option`/empty collections for absent nodes and mutations
/// on unknown nodes are no-ops, so optional page content never needs a
/// separate null check at the call site.
pub trait Document {
    // =========================================================================
    // Queries
    // =========================================================================

    /// All nodes matching `selector`, in document order
    fn query_all(&self, selector: &str) -> Vec<NodeId>;

    /// Descendants of `scope` matching `selector`, in document order
    fn query_within(&self, scope: NodeId, selector: &str) -> Vec<NodeId>;

    /// First node matching `selector`
    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    /// The `<body>` element
    fn body(&self) -> Option<NodeId> {
        self.query("body")
    }

    /// Element with the given `id` attribute
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.query(&format!("#{}", id))
    }

    // =========================================================================
    // Attributes, classes, styles
    // =========================================================================

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn add_class(&mut self, node: NodeId, class: &str);

    fn remove_class(&mut self, node: NodeId, class: &str);

    /// Inline style property
    fn style(&self, node: NodeId, property: &str) -> Option<String>;

    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    // =========================================================================
    // Text
    // =========================================================================

    fn text_content(&self, node: NodeId) -> Option<String>;

    fn set_text_content(&mut self, node: NodeId, text: &str);

    /// Replace all children of `node` with `fragments`
    fn replace_children(&mut self, node: NodeId, fragments: &[Fragment]);

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Bounding box in document space
    fn document_rect(&self, node: NodeId) -> Option<Rect>;

    /// Bounding box relative to the viewport
    fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
        let scroll_y = self.scroll_y();
        self.document_rect(node).map(|r| r.to_viewport(scroll_y))
    }

    fn viewport(&self) -> Size;

    /// Native scroll offset
    fn scroll_y(&self) -> f32;

    /// Native scroll (used when smooth scrolling is unavailable)
    fn scroll_to(&mut self, y: f32);

    // =========================================================================
    // Intersection observation
    // =========================================================================

    /// Start observing `node` with an observer configured by `options`
    ///
    /// The current state is queued as an initial record, as the browser
    /// primitive does.
    fn observe(&mut self, node: NodeId, options: ObserverOptions);

    fn unobserve(&mut self, node: NodeId, options: ObserverOptions);

    fn disconnect_observers(&mut self);

    /// Drain intersection changes queued since the last call
    fn take_intersection_records(&mut self) -> Vec<IntersectionRecord>;

    // =========================================================================
    // Window
    // =========================================================================

    /// `(prefers-reduced-motion: reduce)` media query
    fn prefers_reduced_motion(&self) -> bool;

    fn user_agent(&self) -> String;

    /// Navigate away from the current page
    fn navigate(&mut self, href: &str);
}
