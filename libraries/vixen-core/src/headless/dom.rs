//! In-memory element tree

use crate::traits::Dom;
use crate::types::{ClassOp, ElementHandle, Geometry};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
struct Node {
    kind: String,
    parent: Option<ElementHandle>,
    children: Vec<ElementHandle>,
    classes: Vec<String>,
    text: String,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    listeners: Vec<String>,
    geometry: Geometry,
    offset_parent: Option<ElementHandle>,
}

#[derive(Debug, Default)]
struct Tree {
    nodes: HashMap<ElementHandle, Node>,
    next_id: u64,
}

impl Tree {
    fn node(&self, handle: ElementHandle) -> Option<&Node> {
        self.nodes.get(&handle)
    }

    fn node_mut(&mut self, handle: ElementHandle) -> &mut Node {
        self.nodes.entry(handle).or_default()
    }

    fn detach(&mut self, child: ElementHandle) {
        if let Some(parent) = self.node_mut(child).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != child);
        }
    }
}

/// Element tree kept in memory
///
/// Clones share the same tree, so a driver can keep one clone for
/// inspection while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct HeadlessDom {
    tree: Rc<RefCell<Tree>>,
}

impl HeadlessDom {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `body` root holding one media element; returns `(body, media)`
    pub fn with_media_element(kind: &str) -> (Self, ElementHandle, ElementHandle) {
        let mut dom = Self::new();
        let body = dom.create("body");
        let media = dom.create(kind);
        dom.append(body, media);
        (dom, body, media)
    }

    /// Element kind (`div`, `button`, ...)
    pub fn kind(&self, handle: ElementHandle) -> Option<String> {
        self.tree.borrow().node(handle).map(|n| n.kind.clone())
    }

    /// Classes in insertion order
    pub fn classes(&self, handle: ElementHandle) -> Vec<String> {
        self.tree
            .borrow()
            .node(handle)
            .map(|n| n.classes.clone())
            .unwrap_or_default()
    }

    /// Text content
    pub fn text(&self, handle: ElementHandle) -> String {
        self.tree
            .borrow()
            .node(handle)
            .map(|n| n.text.clone())
            .unwrap_or_default()
    }

    /// Attribute value
    pub fn attribute(&self, handle: ElementHandle, name: &str) -> Option<String> {
        self.tree
            .borrow()
            .node(handle)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    /// Inline style value
    pub fn style(&self, handle: ElementHandle, property: &str) -> Option<String> {
        self.tree
            .borrow()
            .node(handle)
            .and_then(|n| n.styles.get(property).cloned())
    }

    /// Events the controller asked to receive
    pub fn listeners(&self, handle: ElementHandle) -> Vec<String> {
        self.tree
            .borrow()
            .node(handle)
            .map(|n| n.listeners.clone())
            .unwrap_or_default()
    }

    /// Children in order
    pub fn children(&self, handle: ElementHandle) -> Vec<ElementHandle> {
        self.tree
            .borrow()
            .node(handle)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Parent element
    pub fn parent(&self, handle: ElementHandle) -> Option<ElementHandle> {
        self.tree.borrow().node(handle).and_then(|n| n.parent)
    }

    /// Every element carrying `class`, in creation order
    pub fn find_by_class(&self, class: &str) -> Vec<ElementHandle> {
        let tree = self.tree.borrow();
        let mut found: Vec<ElementHandle> = tree
            .nodes
            .iter()
            .filter(|(_, n)| n.classes.iter().any(|c| c == class))
            .map(|(&h, _)| h)
            .collect();
        found.sort();
        found
    }

    /// Set the offset box used by layout reads
    pub fn set_geometry(&self, handle: ElementHandle, geometry: Geometry) {
        self.tree.borrow_mut().node_mut(handle).geometry = geometry;
    }

    /// Override the offset parent; by default it is the tree parent
    pub fn set_offset_parent(&self, handle: ElementHandle, parent: Option<ElementHandle>) {
        self.tree.borrow_mut().node_mut(handle).offset_parent = parent;
    }

    /// Render the subtree as indented lines, for debugging and the simulator
    pub fn dump(&self, root: ElementHandle) -> String {
        let mut out = String::new();
        self.dump_into(root, 0, &mut out);
        out
    }

    fn dump_into(&self, handle: ElementHandle, depth: usize, out: &mut String) {
        let tree = self.tree.borrow();
        let Some(node) = tree.node(handle) else {
            return;
        };
        out.push_str(&"  ".repeat(depth));
        out.push('<');
        out.push_str(&node.kind);
        if !node.classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&node.classes.join(" "));
            out.push('"');
        }
        for (name, value) in &node.styles {
            out.push_str(&format!(" {}:{}", name, value));
        }
        out.push('>');
        if !node.text.is_empty() {
            out.push(' ');
            out.push_str(&node.text);
        }
        out.push('\n');
        let children = node.children.clone();
        drop(tree);
        for child in children {
            self.dump_into(child, depth + 1, out);
        }
    }
}

impl Dom for HeadlessDom {
    fn create(&mut self, kind: &str) -> ElementHandle {
        let mut tree = self.tree.borrow_mut();
        tree.next_id += 1;
        let handle = ElementHandle(tree.next_id);
        tree.nodes.insert(
            handle,
            Node {
                kind: kind.to_string(),
                ..Node::default()
            },
        );
        handle
    }

    fn append(&mut self, parent: ElementHandle, child: ElementHandle) {
        let mut tree = self.tree.borrow_mut();
        tree.detach(child);
        tree.node_mut(child).parent = Some(parent);
        tree.node_mut(parent).children.push(child);
    }

    fn replace(&mut self, node: ElementHandle, replacement: ElementHandle) {
        let mut tree = self.tree.borrow_mut();
        let Some(parent) = tree.node(node).and_then(|n| n.parent) else {
            return;
        };
        tree.detach(replacement);
        let siblings = &mut tree.node_mut(parent).children;
        if let Some(position) = siblings.iter().position(|&c| c == node) {
            siblings[position] = replacement;
        }
        tree.node_mut(node).parent = None;
        tree.node_mut(replacement).parent = Some(parent);
    }

    fn set_class(&mut self, handle: ElementHandle, class: &str, op: ClassOp) {
        let mut tree = self.tree.borrow_mut();
        let classes = &mut tree.node_mut(handle).classes;
        match op {
            ClassOp::Add => {
                if !classes.iter().any(|c| c == class) {
                    classes.push(class.to_string());
                }
            }
            ClassOp::Remove => classes.retain(|c| c != class),
        }
    }

    fn has_class(&self, handle: ElementHandle, class: &str) -> bool {
        self.tree
            .borrow()
            .node(handle)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn set_text(&mut self, handle: ElementHandle, text: &str) {
        self.tree.borrow_mut().node_mut(handle).text = text.to_string();
    }

    fn set_attribute(&mut self, handle: ElementHandle, name: &str, value: &str) {
        self.tree
            .borrow_mut()
            .node_mut(handle)
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn listen(&mut self, handle: ElementHandle, event: &str) {
        let mut tree = self.tree.borrow_mut();
        let listeners = &mut tree.node_mut(handle).listeners;
        if !listeners.iter().any(|l| l == event) {
            listeners.push(event.to_string());
        }
    }

    fn set_style(&mut self, handle: ElementHandle, property: &str, value: &str) {
        self.tree
            .borrow_mut()
            .node_mut(handle)
            .styles
            .insert(property.to_string(), value.to_string());
    }

    fn geometry(&self, handle: ElementHandle) -> Geometry {
        self.tree
            .borrow()
            .node(handle)
            .map(|n| n.geometry)
            .unwrap_or_default()
    }

    fn offset_parent(&self, handle: ElementHandle) -> Option<ElementHandle> {
        let tree = self.tree.borrow();
        let node = tree.node(handle)?;
        node.offset_parent.or(node.parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_addition_is_idempotent() {
        let mut dom = HeadlessDom::new();
        let el = dom.create("div");
        dom.set_class(el, "vixen-playing", ClassOp::Add);
        dom.set_class(el, "vixen-playing", ClassOp::Add);
        assert_eq!(dom.classes(el), vec!["vixen-playing".to_string()]);

        dom.set_class(el, "vixen-playing", ClassOp::Remove);
        assert!(dom.classes(el).is_empty());
    }

    #[test]
    fn replace_keeps_position() {
        let (mut dom, body, media) = HeadlessDom::with_media_element("video");
        let before = dom.create("p");
        dom.append(body, before);
        let container = dom.create("div");

        // media sits first, then the paragraph
        dom.replace(media, container);
        assert_eq!(dom.children(body), vec![container, before]);
        assert_eq!(dom.parent(media), None);

        dom.append(container, media);
        assert_eq!(dom.parent(media), Some(container));
    }

    #[test]
    fn append_moves_existing_child() {
        let mut dom = HeadlessDom::new();
        let a = dom.create("div");
        let b = dom.create("div");
        let child = dom.create("span");
        dom.append(a, child);
        dom.append(b, child);
        assert!(dom.children(a).is_empty());
        assert_eq!(dom.children(b), vec![child]);
    }

    #[test]
    fn offset_parent_defaults_to_tree_parent() {
        let mut dom = HeadlessDom::new();
        let outer = dom.create("div");
        let inner = dom.create("div");
        dom.append(outer, inner);
        assert_eq!(dom.offset_parent(inner), Some(outer));

        dom.set_offset_parent(inner, None);
        // An explicit `None` falls back to the tree parent
        assert_eq!(dom.offset_parent(inner), Some(outer));
    }
}
