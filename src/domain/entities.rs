//! Domain entities: core data structures

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a node, taken verbatim from the record's id field.
///
/// Integer and string ids never compare equal to each other, so `1` and `"1"`
/// address different nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Int(i64),
    Str(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Int(id) => write!(f, "{id}"),
            NodeId::Str(id) => write!(f, "{id}"),
        }
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        NodeId::Int(id)
    }
}

impl From<i32> for NodeId {
    fn from(id: i32) -> Self {
        NodeId::Int(i64::from(id))
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        NodeId::Int(i64::from(id))
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId::Str(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId::Str(id)
    }
}

/// Pagination hint for lazily loaded subtrees (`total`, `page`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageHint {
    Number(i64),
    Text(String),
}

impl From<i64> for PageHint {
    fn from(value: i64) -> Self {
        PageHint::Number(value)
    }
}

impl From<i32> for PageHint {
    fn from(value: i32) -> Self {
        PageHint::Number(i64::from(value))
    }
}

impl From<&str> for PageHint {
    fn from(value: &str) -> Self {
        PageHint::Text(value.to_string())
    }
}

impl From<String> for PageHint {
    fn from(value: String) -> Self {
        PageHint::Text(value)
    }
}

/// Presentation state attached to every node.
///
/// The typed fields are the ones the store reads and writes. `extra` is the
/// caller's side table; the store merges it but never interprets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Properties {
    /// Depth from the root, roots are level 0
    pub level: u32,
    pub is_open: bool,
    pub is_loading: bool,
    pub is_active: bool,
    pub is_leaf: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<PageHint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageHint>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Properties {
    /// Default properties for a record built at `depth` (level = depth + 1).
    pub fn at_depth(depth: i32) -> Self {
        Self {
            level: u32::try_from(depth.saturating_add(1)).unwrap_or(0),
            ..Self::default()
        }
    }

    /// Shallow merge: every field set in `patch` overwrites the current value.
    pub fn merge(&mut self, patch: &PropertiesPatch) {
        if let Some(level) = patch.level {
            self.level = level;
        }
        if let Some(is_open) = patch.is_open {
            self.is_open = is_open;
        }
        if let Some(is_loading) = patch.is_loading {
            self.is_loading = is_loading;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(is_leaf) = patch.is_leaf {
            self.is_leaf = is_leaf;
        }
        if let Some(total) = &patch.total {
            self.total = Some(total.clone());
        }
        if let Some(page) = &patch.page {
            self.page = Some(page.clone());
        }
        for (key, value) in &patch.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

/// Partial [`Properties`]; unset fields leave the target untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertiesPatch {
    pub level: Option<u32>,
    pub is_open: Option<bool>,
    pub is_loading: Option<bool>,
    pub is_active: Option<bool>,
    pub is_leaf: Option<bool>,
    pub total: Option<PageHint>,
    pub page: Option<PageHint>,
    pub extra: BTreeMap<String, Value>,
}

impl PropertiesPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_open(mut self, is_open: bool) -> Self {
        self.is_open = Some(is_open);
        self
    }

    pub fn with_loading(mut self, is_loading: bool) -> Self {
        self.is_loading = Some(is_loading);
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn with_leaf(mut self, is_leaf: bool) -> Self {
        self.is_leaf = Some(is_leaf);
        self
    }

    pub fn with_total(mut self, total: impl Into<PageHint>) -> Self {
        self.total = Some(total.into());
        self
    }

    pub fn with_page(mut self, page: impl Into<PageHint>) -> Self {
        self.page = Some(page.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// True when merging this patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Canonical tree element.
///
/// `children` is `None` while the subtree has not been loaded and
/// `Some(vec![])` once it is known to be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node<D = Value> {
    pub id: NodeId,
    pub title: String,
    pub data: D,
    pub properties: Properties,
    pub children: Option<Vec<Node<D>>>,
}

impl<D> Node<D> {
    pub fn new(id: impl Into<NodeId>, title: impl Into<String>, data: D) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            data,
            properties: Properties::default(),
            children: None,
        }
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_children(mut self, children: Vec<Node<D>>) -> Self {
        self.children = Some(children);
        self
    }

    /// Children are still unknown (lazy-load placeholder).
    pub fn is_unloaded(&self) -> bool {
        self.children.is_none()
    }

    /// Loaded children, or an empty slice for an unloaded node.
    pub fn child_nodes(&self) -> &[Node<D>] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// True when one of the direct children carries `id`.
    pub fn has_child(&self, id: &NodeId) -> bool {
        self.child_nodes().iter().any(|child| &child.id == id)
    }
}

impl<D: Clone> Node<D> {
    /// Clone everything except the subtree; `children` comes back as `None`.
    ///
    /// Updaters return this so the engine falls back to the original children
    /// without copying them first.
    pub fn shallow_clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            data: self.data.clone(),
            properties: self.properties.clone(),
            children: None,
        }
    }
}

/// One committed tree snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree<D = Value> {
    /// Incremented by one on every committed mutation
    pub revision: u64,
    pub roots: Vec<Node<D>>,
}

impl<D> Default for Tree<D> {
    fn default() -> Self {
        Self {
            revision: 0,
            roots: Vec::new(),
        }
    }
}
