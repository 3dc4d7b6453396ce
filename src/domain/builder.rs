//! Tree builder for converting nested source records into nodes.

use std::fmt;

use tracing::{debug, instrument};

use crate::domain::entities::{Node, Properties};
use crate::domain::error::{DomainError, TreeResult};
use crate::domain::record::{IdField, SourceRecord};

/// Derives the initial properties of a node from its record and depth.
pub type Initializer<R> = Box<dyn Fn(&R, i32) -> Properties>;

/// Field selectors and property derivation used by [`TreeBuilder`].
pub struct BuildOptions<R> {
    pub id_key: String,
    pub title_key: String,
    pub children_key: String,
    /// Falls back to [`Properties::at_depth`] when unset
    pub initializer: Option<Initializer<R>>,
    /// Depth passed for top-level records; -1 puts roots at level 0
    pub initial_depth: i32,
}

impl<R> BuildOptions<R> {
    pub fn new(
        id_key: impl Into<String>,
        title_key: impl Into<String>,
        children_key: impl Into<String>,
    ) -> Self {
        Self {
            id_key: id_key.into(),
            title_key: title_key.into(),
            children_key: children_key.into(),
            initializer: None,
            initial_depth: -1,
        }
    }

    pub fn with_initializer(mut self, initializer: impl Fn(&R, i32) -> Properties + 'static) -> Self {
        self.initializer = Some(Box::new(initializer));
        self
    }

    pub fn with_initial_depth(mut self, depth: i32) -> Self {
        self.initial_depth = depth;
        self
    }

    fn properties(&self, record: &R, depth: i32) -> Properties {
        match &self.initializer {
            Some(initializer) => initializer(record, depth),
            None => Properties::at_depth(depth),
        }
    }
}

impl<R> fmt::Debug for BuildOptions<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildOptions")
            .field("id_key", &self.id_key)
            .field("title_key", &self.title_key)
            .field("children_key", &self.children_key)
            .field("initializer", &self.initializer.is_some())
            .field("initial_depth", &self.initial_depth)
            .finish()
    }
}

/// Constructs node trees from nested source records.
///
/// Building is pure: the same records and a deterministic initializer always
/// produce the same tree.
#[derive(Debug)]
pub struct TreeBuilder<R> {
    options: BuildOptions<R>,
}

impl<R: SourceRecord> TreeBuilder<R> {
    pub fn new(options: BuildOptions<R>) -> Self {
        Self { options }
    }

    /// Build one node per record, recursively, preserving input order.
    ///
    /// # Errors
    /// Fails on the first record without a usable id or title field. No
    /// partial tree is returned.
    #[instrument(level = "debug", skip(self, records), fields(count = records.len()))]
    pub fn build(&self, records: &[R]) -> TreeResult<Vec<Node<R>>> {
        let nodes = self.build_level(records, self.options.initial_depth)?;
        debug!("build: created {} root nodes", nodes.len());
        Ok(nodes)
    }

    fn build_level(&self, records: &[R], depth: i32) -> TreeResult<Vec<Node<R>>> {
        records
            .iter()
            .map(|record| self.build_node(record, depth))
            .collect()
    }

    fn build_node(&self, record: &R, depth: i32) -> TreeResult<Node<R>> {
        let children = match record.record_children(&self.options.children_key) {
            Some(nested) => Some(self.build_level(nested, depth.saturating_add(1))?),
            None => None,
        };

        let id = match record.record_id(&self.options.id_key) {
            IdField::Present(id) => id,
            IdField::Invalid(found) => {
                return Err(DomainError::InvalidId {
                    key: self.options.id_key.clone(),
                    found,
                })
            }
            IdField::Missing => {
                return Err(DomainError::MissingId {
                    key: self.options.id_key.clone(),
                })
            }
        };
        let title = record
            .record_title(&self.options.title_key)
            .ok_or_else(|| DomainError::MissingTitle {
                key: self.options.title_key.clone(),
            })?;

        Ok(Node {
            id,
            title,
            data: record.clone(),
            properties: self.options.properties(record, depth),
            children,
        })
    }
}

/// Build a tree with one-off options; see [`TreeBuilder::build`].
pub fn build_tree<R: SourceRecord>(records: &[R], options: BuildOptions<R>) -> TreeResult<Vec<Node<R>>> {
    TreeBuilder::new(options).build(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NodeId;
    use serde_json::{json, Value};

    fn employees() -> BuildOptions<Value> {
        BuildOptions::new("id", "name", "employees")
    }

    #[test]
    fn given_nested_records_when_building_then_levels_follow_nesting() {
        let records = vec![json!({
            "id": 1,
            "name": "Root 1",
            "employees": [{"id": 2, "name": "Child 1", "employees": [
                {"id": 3, "name": "Grandchild", "employees": []}
            ]}]
        })];

        let tree = build_tree(&records, employees()).unwrap();

        let root = &tree[0];
        let child = &root.child_nodes()[0];
        let grandchild = &child.child_nodes()[0];
        assert_eq!(root.properties.level, 0);
        assert_eq!(child.properties.level, 1);
        assert_eq!(grandchild.properties.level, 2);
        assert_eq!(grandchild.children, Some(vec![]));
    }

    #[test]
    fn given_custom_initializer_when_building_then_receives_nesting_depth() {
        let records = vec![json!({"id": 1, "name": "a", "employees": [{"id": 2, "name": "b"}]})];
        let options = employees().with_initializer(|record: &Value, depth| Properties {
            level: u32::try_from(depth + 1).unwrap_or(0),
            is_open: record["id"] == json!(1),
            ..Properties::default()
        });

        let tree = build_tree(&records, options).unwrap();

        assert!(tree[0].properties.is_open);
        assert_eq!(tree[0].child_nodes()[0].properties.level, 1);
        assert!(!tree[0].child_nodes()[0].properties.is_open);
    }

    #[test]
    fn given_initial_depth_when_building_then_roots_start_deeper() {
        let records = vec![json!({"id": "x", "name": "x"})];

        let tree = build_tree(&records, employees().with_initial_depth(1)).unwrap();

        assert_eq!(tree[0].properties.level, 2);
        assert_eq!(tree[0].id, NodeId::from("x"));
        assert!(tree[0].is_unloaded());
    }

    #[test]
    fn given_record_without_title_when_building_then_errors() {
        let records = vec![json!({"id": 1, "employees": []})];

        let err = build_tree(&records, employees()).unwrap_err();

        assert_eq!(err, DomainError::MissingTitle { key: "name".into() });
    }

    #[test]
    fn given_nested_record_with_bad_id_when_building_then_errors() {
        let records = vec![json!({"id": 1, "name": "a", "employees": [{"id": true, "name": "b"}]})];

        let err = build_tree(&records, employees()).unwrap_err();

        assert_eq!(
            err,
            DomainError::InvalidId {
                key: "id".into(),
                found: "true".into()
            }
        );
    }
}
