//! In-memory document
//!
//! A node tree with document-space geometry, a selector engine and an
//! intersection observer that re-evaluates on scroll and resize. Nodes
//! without their own rect inherit the nearest ancestor's.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, Key, KeyData, SlotMap};
use tracing::{debug, warn};
use unveil_platform::{
    Document, Fragment, IntersectionRecord, NodeId, ObserverOptions, Rect, Size,
};

use crate::selector::{SelectorList, SelectorTarget};

new_key_type! {
    /// Handle to a node in a [`MemoryDocument`]
    pub struct NodeKey;
}

impl NodeKey {
    pub fn to_node_id(self) -> NodeId {
        NodeId::from_raw(self.data().as_ffi())
    }

    pub fn from_node_id(id: NodeId) -> Self {
        NodeKey::from(KeyData::from_ffi(id.to_raw()))
    }
}

/// Declarative description of an element subtree
///
/// Used both by tests and by TOML page fixtures.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSpec {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: IndexMap<String, String>,
    pub text: Option<String>,
    /// Document-space top edge; omit to inherit the parent's rect
    pub top: Option<f32>,
    pub height: Option<f32>,
    pub left: Option<f32>,
    /// Defaults to the viewport width
    pub width: Option<f32>,
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.extend(class.split_whitespace().map(str::to_string));
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Place the element at `top` with `height`
    pub fn at(mut self, top: f32, height: f32) -> Self {
        self.top = Some(top);
        self.height = Some(height);
        self
    }

    pub fn horizontal(mut self, left: f32, width: f32) -> Self {
        self.left = Some(left);
        self.width = Some(width);
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = NodeSpec>) -> Self {
        self.children.extend(children);
        self
    }
}

#[derive(Clone, Debug, Default)]
struct ElementData {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: IndexMap<String, String>,
    styles: IndexMap<String, String>,
    rect: Option<Rect>,
}

#[derive(Clone, Debug)]
enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Observation {
    node: NodeKey,
    options: ObserverOptions,
    intersecting: bool,
}

/// In-memory [`Document`] implementation
#[derive(Debug)]
pub struct MemoryDocument {
    nodes: SlotMap<NodeKey, NodeData>,
    root: NodeKey,
    body: NodeKey,
    viewport: Size,
    scroll_y: f32,
    observations: Vec<Observation>,
    records: Vec<IntersectionRecord>,
    reduced_motion: bool,
    user_agent: String,
    navigations: Vec<String>,
}

impl MemoryDocument {
    /// Empty document with `<html><body></body></html>`
    pub fn new(viewport: Size) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData {
            kind: NodeKind::Element(ElementData {
                tag: "html".to_string(),
                ..Default::default()
            }),
            parent: None,
            children: Vec::new(),
        });
        let body = nodes.insert(NodeData {
            kind: NodeKind::Element(ElementData {
                tag: "body".to_string(),
                ..Default::default()
            }),
            parent: Some(root),
            children: Vec::new(),
        });
        nodes[root].children.push(body);

        Self {
            nodes,
            root,
            body,
            viewport,
            scroll_y: 0.0,
            observations: Vec::new(),
            records: Vec::new(),
            reduced_motion: false,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) unveil-headless".to_string(),
            navigations: Vec::new(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.reduced_motion = reduced_motion;
        self
    }

    pub fn body_id(&self) -> NodeId {
        self.body.to_node_id()
    }

    /// Append a subtree under `parent`, returning the new root element
    pub fn append(&mut self, parent: NodeId, spec: &NodeSpec) -> Option<NodeId> {
        let parent = NodeKey::from_node_id(parent);
        if !self.is_element(parent) {
            return None;
        }
        Some(self.insert_spec(parent, spec).to_node_id())
    }

    /// Append a subtree under `<body>`
    pub fn append_to_body(&mut self, spec: &NodeSpec) -> NodeId {
        self.insert_spec(self.body, spec).to_node_id()
    }

    fn insert_spec(&mut self, parent: NodeKey, spec: &NodeSpec) -> NodeKey {
        let rect = spec.top.map(|top| {
            Rect::new(
                spec.left.unwrap_or(0.0),
                top,
                spec.width.unwrap_or(self.viewport.width),
                spec.height.unwrap_or(0.0),
            )
        });
        let key = self.nodes.insert(NodeData {
            kind: NodeKind::Element(ElementData {
                tag: spec.tag.to_ascii_lowercase(),
                id: spec.id.clone(),
                classes: spec.classes.clone(),
                attributes: spec.attributes.clone(),
                styles: IndexMap::new(),
                rect,
            }),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(key);

        if let Some(text) = &spec.text {
            self.insert_text(key, text);
        }
        for child in &spec.children {
            self.insert_spec(key, child);
        }
        key
    }

    fn insert_text(&mut self, parent: NodeKey, text: &str) -> NodeKey {
        let key = self.nodes.insert(NodeData {
            kind: NodeKind::Text(text.to_string()),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(key);
        key
    }

    /// Hrefs passed to [`Document::navigate`], in order
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    /// Number of live observations
    pub fn observed_count(&self) -> usize {
        self.observations.len()
    }

    pub fn is_observed(&self, node: NodeId) -> bool {
        let key = NodeKey::from_node_id(node);
        self.observations.iter().any(|o| o.node == key)
    }

    /// Short selector-like label such as `div#intro.card.wide`
    pub fn describe(&self, node: NodeId) -> Option<String> {
        let element = self.element(NodeKey::from_node_id(node))?;
        let mut out = element.tag.clone();
        if let Some(id) = &element.id {
            out.push('#');
            out.push_str(id);
        }
        for class in &element.classes {
            out.push('.');
            out.push_str(class);
        }
        Some(out)
    }

    /// Serialized children of an element
    pub fn inner_markup(&self, node: NodeId) -> Option<String> {
        let key = NodeKey::from_node_id(node);
        let data = self.nodes.get(key)?;
        let mut out = String::new();
        for &child in &data.children {
            self.write_markup(child, &mut out);
        }
        Some(out)
    }

    fn write_markup(&self, key: NodeKey, out: &mut String) {
        let Some(data) = self.nodes.get(key) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                if !element.classes.is_empty() {
                    out.push_str(&format!(" class=\"{}\"", element.classes.join(" ")));
                }
                if !element.styles.is_empty() {
                    let style: Vec<String> = element
                        .styles
                        .iter()
                        .map(|(k, v)| format!("{}: {};", k, v))
                        .collect();
                    out.push_str(&format!(" style=\"{}\"", style.join(" ")));
                }
                out.push('>');
                for &child in &data.children {
                    self.write_markup(child, out);
                }
                out.push_str(&format!("</{}>", element.tag));
            }
        }
    }

    fn element(&self, key: NodeKey) -> Option<&ElementData> {
        match &self.nodes.get(key)?.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, key: NodeKey) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(key)?.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    fn is_element(&self, key: NodeKey) -> bool {
        self.element(key).is_some()
    }

    /// Elements under `scope` in document order (pre-order), excluding `scope`
    fn descendants(&self, scope: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeKey> = self
            .nodes
            .get(scope)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(key) = stack.pop() {
            let Some(data) = self.nodes.get(key) else {
                continue;
            };
            if matches!(data.kind, NodeKind::Element(_)) {
                out.push(key);
                stack.extend(data.children.iter().rev().copied());
            }
        }
        out
    }

    fn select(&self, list: &SelectorList, scope: NodeKey) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&key| list.matches(ElementRef { doc: self, key }))
            .map(NodeKey::to_node_id)
            .collect()
    }

    fn remove_subtree(&mut self, key: NodeKey) {
        let mut stack = vec![key];
        while let Some(key) = stack.pop() {
            if let Some(data) = self.nodes.remove(key) {
                stack.extend(data.children);
            }
        }
        self.observations.retain(|o| o.node != key);
    }

    fn insert_fragment(&mut self, parent: NodeKey, fragment: &Fragment) {
        match fragment {
            Fragment::Text(text) => {
                self.insert_text(parent, text);
            }
            Fragment::Span {
                class,
                clip,
                children,
            } => {
                let mut styles = IndexMap::new();
                styles.insert("display".to_string(), "inline-block".to_string());
                if *clip {
                    styles.insert("overflow".to_string(), "hidden".to_string());
                }
                let key = self.nodes.insert(NodeData {
                    kind: NodeKind::Element(ElementData {
                        tag: "span".to_string(),
                        classes: class.iter().cloned().collect(),
                        styles,
                        ..Default::default()
                    }),
                    parent: Some(parent),
                    children: Vec::new(),
                });
                self.nodes[parent].children.push(key);
                for child in children {
                    self.insert_fragment(key, child);
                }
            }
        }
    }

    fn own_or_inherited_rect(&self, key: NodeKey) -> Option<Rect> {
        let mut current = Some(key);
        while let Some(key) = current {
            let data = self.nodes.get(key)?;
            if let NodeKind::Element(ElementData { rect: Some(rect), .. }) = &data.kind {
                return Some(*rect);
            }
            current = data.parent;
        }
        None
    }

    fn is_intersecting(&self, key: NodeKey, options: ObserverOptions) -> bool {
        let Some(rect) = self.own_or_inherited_rect(key) else {
            return false;
        };
        let rect = rect.to_viewport(self.scroll_y);
        let root_bottom = self.viewport.height * (1.0 + options.bottom_margin);
        rect.top() <= root_bottom && rect.bottom() >= 0.0
    }

    /// Queue records for every observation whose state changed
    fn recompute_intersections(&mut self) {
        for index in 0..self.observations.len() {
            let observation = self.observations[index];
            let now = self.is_intersecting(observation.node, observation.options);
            if now != observation.intersecting {
                self.observations[index].intersecting = now;
                self.records.push(IntersectionRecord {
                    node: observation.node.to_node_id(),
                    options: observation.options,
                    is_intersecting: now,
                });
            }
        }
    }

    /// Resize the viewport and re-evaluate observers
    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.recompute_intersections();
    }
}

#[derive(Clone, Copy)]
struct ElementRef<'a> {
    doc: &'a MemoryDocument,
    key: NodeKey,
}

impl SelectorTarget for ElementRef<'_> {
    fn tag(&self) -> Option<&str> {
        self.doc.element(self.key).map(|e| e.tag.as_str())
    }

    fn element_id(&self) -> Option<&str> {
        self.doc.element(self.key)?.id.as_deref()
    }

    fn has_class(&self, class: &str) -> bool {
        self.doc
            .element(self.key)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        let element = self.doc.element(self.key)?;
        match name {
            "id" => element.id.as_deref(),
            _ => element.attributes.get(name).map(String::as_str),
        }
    }

    fn parent(&self) -> Option<Self> {
        let parent = self.doc.nodes.get(self.key)?.parent?;
        Some(ElementRef {
            doc: self.doc,
            key: parent,
        })
    }
}

impl Document for MemoryDocument {
    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.query_within(self.root.to_node_id(), selector)
    }

    fn query_within(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let scope = NodeKey::from_node_id(scope);
        if !self.is_element(scope) {
            return Vec::new();
        }
        match SelectorList::parse(selector) {
            Ok(list) => self.select(&list, scope),
            Err(err) => {
                warn!("Invalid selector: {}", err);
                Vec::new()
            }
        }
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.body.to_node_id())
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&key| self.element(key).and_then(|e| e.id.as_deref()) == Some(id))
            .map(NodeKey::to_node_id)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        ElementRef {
            doc: self,
            key: NodeKey::from_node_id(node),
        }
        .attribute(name)
        .map(str::to_string)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(NodeKey::from_node_id(node)) {
            if name == "id" {
                element.id = Some(value.to_string());
            } else {
                element
                    .attributes
                    .insert(name.to_string(), value.to_string());
            }
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        ElementRef {
            doc: self,
            key: NodeKey::from_node_id(node),
        }
        .has_class(class)
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element_mut(NodeKey::from_node_id(node)) {
            if !element.classes.iter().any(|c| c == class) {
                element.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element_mut(NodeKey::from_node_id(node)) {
            element.classes.retain(|c| c != class);
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.element(NodeKey::from_node_id(node))?
            .styles
            .get(property)
            .cloned()
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(element) = self.element_mut(NodeKey::from_node_id(node)) {
            element
                .styles
                .insert(property.to_string(), value.to_string());
        }
    }

    fn text_content(&self, node: NodeId) -> Option<String> {
        let key = NodeKey::from_node_id(node);
        self.nodes.get(key)?;
        let mut out = String::new();
        let mut stack = vec![key];
        while let Some(key) = stack.pop() {
            let Some(data) = self.nodes.get(key) else {
                continue;
            };
            match &data.kind {
                NodeKind::Text(text) => out.push_str(text),
                NodeKind::Element(_) => stack.extend(data.children.iter().rev().copied()),
            }
        }
        Some(out)
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        let key = NodeKey::from_node_id(node);
        if !self.is_element(key) {
            return;
        }
        for child in std::mem::take(&mut self.nodes[key].children) {
            self.remove_subtree(child);
        }
        self.insert_text(key, text);
    }

    fn replace_children(&mut self, node: NodeId, fragments: &[Fragment]) {
        let key = NodeKey::from_node_id(node);
        if !self.is_element(key) {
            return;
        }
        for child in std::mem::take(&mut self.nodes[key].children) {
            self.remove_subtree(child);
        }
        for fragment in fragments {
            self.insert_fragment(key, fragment);
        }
        debug!("Replaced children of {:?} with {} fragments", node, fragments.len());
    }

    fn document_rect(&self, node: NodeId) -> Option<Rect> {
        self.own_or_inherited_rect(NodeKey::from_node_id(node))
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    fn scroll_to(&mut self, y: f32) {
        self.scroll_y = y.max(0.0);
        self.recompute_intersections();
    }

    fn observe(&mut self, node: NodeId, options: ObserverOptions) {
        let key = NodeKey::from_node_id(node);
        if !self.is_element(key)
            || self
                .observations
                .iter()
                .any(|o| o.node == key && o.options == options)
        {
            return;
        }
        let intersecting = self.is_intersecting(key, options);
        self.observations.push(Observation {
            node: key,
            options,
            intersecting,
        });
        self.records.push(IntersectionRecord {
            node,
            options,
            is_intersecting: intersecting,
        });
    }

    fn unobserve(&mut self, node: NodeId, options: ObserverOptions) {
        let key = NodeKey::from_node_id(node);
        self.observations
            .retain(|o| !(o.node == key && o.options == options));
    }

    fn disconnect_observers(&mut self) {
        self.observations.clear();
        self.records.clear();
    }

    fn take_intersection_records(&mut self) -> Vec<IntersectionRecord> {
        std::mem::take(&mut self.records)
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn navigate(&mut self, href: &str) {
        debug!("Navigate to {}", href);
        self.navigations.push(href.to_string());
    }
}
