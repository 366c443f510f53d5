//! Element nodes of the in-memory document.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::util::lock;

use super::selector::{Compound, Selector};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

pub const PLACEHOLDER_CLASS: &str = "dom-placeholder";

#[derive(Debug, Default)]
struct NodeData {
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    text: String,
    hidden: bool,
    children: Vec<ElementHandle>,
}

struct Node {
    node_id: u64,
    tag: String,
    data: Mutex<NodeData>,
}

/// Shared handle to an element. Clones refer to the same node; equality is
/// identity.
#[derive(Clone)]
pub struct ElementHandle(Arc<Node>);

impl ElementHandle {
    pub fn new(tag: &str) -> Self {
        Self(Arc::new(Node {
            node_id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
            tag: tag.to_lowercase(),
            data: Mutex::new(NodeData::default()),
        }))
    }

    /// Hidden stand-in for an element that could not be found.
    pub fn placeholder(key: &str, selector: &str) -> Self {
        Self::new("div")
            .with_id(&format!("placeholder-{}", key))
            .with_class(PLACEHOLDER_CLASS)
            .with_attr("data-placeholder", "true")
            .with_attr("data-original-selector", selector)
            .with_attr("data-key", key)
            .with_hidden(true)
    }

    pub fn with_id(self, id: &str) -> Self {
        self.set_attr("id", id);
        self
    }

    pub fn with_class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_hidden(self, hidden: bool) -> Self {
        self.set_hidden(hidden);
        self
    }

    pub fn with_child(self, child: ElementHandle) -> Self {
        self.append_child(child);
        self
    }

    pub fn node_id(&self) -> u64 {
        self.0.node_id
    }

    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    pub fn id(&self) -> Option<String> {
        self.attr("id")
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        lock(&self.0.data).attributes.get(name).cloned()
    }

    pub fn set_attr(&self, name: &str, value: &str) {
        lock(&self.0.data)
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove_attr(&self, name: &str) {
        lock(&self.0.data).attributes.remove(name);
    }

    pub fn has_class(&self, class: &str) -> bool {
        lock(&self.0.data).classes.iter().any(|c| c == class)
    }

    pub fn add_class(&self, class: &str) {
        let mut data = lock(&self.0.data);
        if !data.classes.iter().any(|c| c == class) {
            data.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&self, class: &str) {
        lock(&self.0.data).classes.retain(|c| c != class);
    }

    /// Add or remove `class`; returns whether it is now present.
    pub fn toggle_class(&self, class: &str, on: bool) -> bool {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
        on
    }

    pub fn classes(&self) -> Vec<String> {
        lock(&self.0.data).classes.clone()
    }

    pub fn text(&self) -> String {
        lock(&self.0.data).text.clone()
    }

    pub fn set_text(&self, text: &str) {
        lock(&self.0.data).text = text.to_string();
    }

    pub fn is_hidden(&self) -> bool {
        lock(&self.0.data).hidden
    }

    pub fn set_hidden(&self, hidden: bool) {
        lock(&self.0.data).hidden = hidden;
    }

    pub fn is_placeholder(&self) -> bool {
        self.attr("data-placeholder").as_deref() == Some("true")
    }

    pub fn children(&self) -> Vec<ElementHandle> {
        lock(&self.0.data).children.clone()
    }

    pub fn child_count(&self) -> usize {
        lock(&self.0.data).children.len()
    }

    /// Append `child`. Appending a node to itself is ignored.
    pub fn append_child(&self, child: ElementHandle) {
        if child == *self {
            return;
        }
        lock(&self.0.data).children.push(child);
    }

    /// Remove `child` from this element's direct children.
    pub fn remove_child(&self, child: &ElementHandle) -> bool {
        let mut data = lock(&self.0.data);
        let before = data.children.len();
        data.children.retain(|c| c != child);
        before != data.children.len()
    }

    /// Remove every child, returning them.
    pub fn clear_children(&self) -> Vec<ElementHandle> {
        std::mem::take(&mut lock(&self.0.data).children)
    }

    /// Replace the children in one step.
    pub fn replace_children(&self, children: Vec<ElementHandle>) {
        lock(&self.0.data).children = children;
    }

    /// Whether this element satisfies the last step of `selector`.
    pub fn matches(&self, selector: &Selector) -> bool {
        self.matches_compound(selector.last())
    }

    pub(crate) fn matches_compound(&self, compound: &Compound) -> bool {
        if let Some(tag) = &compound.tag {
            if *tag != self.0.tag {
                return false;
            }
        }
        let data = lock(&self.0.data);
        if let Some(id) = &compound.id {
            if data.attributes.get("id") != Some(id) {
                return false;
            }
        }
        if !compound
            .classes
            .iter()
            .all(|class| data.classes.iter().any(|c| c == class))
        {
            return false;
        }
        compound
            .attributes
            .iter()
            .all(|(name, expected)| match (data.attributes.get(name), expected) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
                (None, _) => false,
            })
    }

    /// Every element below this one, depth first, in document order.
    pub fn descendants(&self) -> Vec<ElementHandle> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementHandle> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            stack.extend(node.children().into_iter().rev());
            out.push(node);
        }
        out
    }

    /// First descendant matching `selector`.
    pub fn find(&self, selector: &Selector) -> Option<ElementHandle> {
        self.find_all(selector).into_iter().next()
    }

    /// Every descendant matching `selector`, in document order.
    pub fn find_all(&self, selector: &Selector) -> Vec<ElementHandle> {
        let mut scopes = vec![self.clone()];
        for step in &selector.steps {
            let mut next: Vec<ElementHandle> = Vec::new();
            for scope in &scopes {
                for node in scope.descendants() {
                    if node.matches_compound(step) && !next.contains(&node) {
                        next.push(node);
                    }
                }
            }
            if next.is_empty() {
                return next;
            }
            scopes = next;
        }
        scopes
    }

    /// Whether `other` is this element or one of its descendants.
    pub fn contains(&self, other: &ElementHandle) -> bool {
        self == other || self.descendants().iter().any(|n| n == other)
    }
}

impl PartialEq for ElementHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ElementHandle {}

impl fmt::Debug for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Element");
        out.field("tag", &self.0.tag).field("node", &self.0.node_id);
        if let Some(id) = self.id() {
            out.field("id", &id);
        }
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    fn category_list() -> ElementHandle {
        ElementHandle::new("ul").with_id("categoryList").with_child(
            ElementHandle::new("li")
                .with_class("category-item")
                .with_attr("data-category", "science")
                .with_child(ElementHandle::new("span").with_class("count")),
        )
    }

    #[test]
    fn test_matches_compound() {
        let item = ElementHandle::new("li")
            .with_class("category-item")
            .with_class("active")
            .with_attr("data-category", "science");
        assert!(item.matches(&sel("li.category-item")));
        assert!(item.matches(&sel(".active[data-category=science]")));
        assert!(item.matches(&sel("[data-category]")));
        assert!(!item.matches(&sel("li.featured")));
        assert!(!item.matches(&sel("[data-category=\"fiction\"]")));
    }

    #[test]
    fn test_find_with_descendant_combinator() {
        let body = ElementHandle::new("body").with_child(category_list());
        let counts = body.find_all(&sel("#categoryList .count"));
        assert_eq!(counts.len(), 1);
        assert!(body.find(&sel("#sidebar .count")).is_none());
    }

    #[test]
    fn test_identity_equality_and_contains() {
        let list = category_list();
        let item = list.children()[0].clone();
        assert!(list.contains(&item));
        assert_ne!(item, ElementHandle::new("li"));

        assert!(list.remove_child(&item));
        assert!(!list.contains(&item));
    }

    #[test]
    fn test_placeholder_is_hidden() {
        let placeholder = ElementHandle::placeholder("booksGrid", "#booksGrid");
        assert!(placeholder.is_placeholder());
        assert!(placeholder.is_hidden());
        assert_eq!(placeholder.id().as_deref(), Some("placeholder-booksGrid"));
        assert_eq!(
            placeholder.attr("data-original-selector").as_deref(),
            Some("#booksGrid")
        );
    }
}
