//! In-memory tree model for tree-view state.
//!
//! Nested source records are turned into [`Node`]s by the [`TreeBuilder`];
//! a [`TreeStore`] then holds the tree and answers structural queries and
//! immutable updates (open/close, activation, lazy child attachment,
//! ancestry lookup).
//!
//! ```
//! use rstree::{BuildOptions, NodeId, TreeStore};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), rstree::ApplicationError> {
//! let records = vec![json!({"id": 1, "name": "Root 1", "employees": [
//!     {"id": 2, "name": "Child 1", "employees": []}
//! ]})];
//! let mut store = TreeStore::from_records(&records, BuildOptions::new("id", "name", "employees"))?;
//! store.toggle_open(&NodeId::from(1));
//!
//! assert_eq!(store.open_ids(), vec![NodeId::from(1)]);
//! assert_eq!(store.get_ancestors(&NodeId::from(2))[0].title, "Root 1");
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod tree_traits;
pub mod util;

pub use application::{ApplicationError, ApplicationResult, TreeStore};
pub use domain::{
    build_tree, BuildOptions, DomainError, Node, NodeId, NodeUpdate, PageHint, Properties,
    PropertiesPatch, PropertiesUpdate, SourceRecord, Tree, TreeBuilder, Update,
};
pub use tree_traits::{render_outline, TreeNodeConvert};
