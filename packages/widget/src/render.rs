//! Render tree and render context for document-kind widgets.
//!
//! A document widget's `render` function is a pure projection from
//! `(context, state, config)` to a [`RenderTree`]. The runtime reconciles
//! the returned tree into the container; re-invoking `render` must be safe
//! at any time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The declarative output of a document widget's render step.
///
/// Trees are plain values: comparing the reconciled tree against an expected
/// tree with `==` is the supported way to assert on rendered output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RenderTree {
    /// An element node with a tag, attributes and children.
    Element(Element),
    /// A text node.
    Text(String),
}

impl RenderTree {
    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        RenderTree::Text(content.into())
    }

    /// Create an element node with no attributes or children.
    pub fn element(tag: impl Into<String>) -> Element {
        Element::new(tag)
    }
}

/// An element node in a [`RenderTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Tag name, e.g. `"section"`.
    pub tag: String,

    /// Attributes in deterministic (sorted) order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,

    /// Child nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderTree>,
}

impl Element {
    /// Create an empty element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing any previous value.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Append a child node.
    pub fn child(mut self, child: impl Into<RenderTree>) -> Self {
        self.children.push(child.into());
        self
    }
}

impl From<Element> for RenderTree {
    fn from(element: Element) -> Self {
        RenderTree::Element(element)
    }
}

/// Context handed to a document widget's render function.
///
/// Built once at mount time by the widget's `create_context` (when present)
/// and reused for every subsequent re-render. The runtime treats the
/// contents as opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    values: BTreeMap<String, serde_json::Value>,
}

impl RenderContext {
    /// Create an empty context.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Insert a value, builder style.
    pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Number of entries in the context.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
