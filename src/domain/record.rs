//! Field access on caller-supplied source records.

use serde_json::Value;

use crate::domain::entities::NodeId;

/// Outcome of reading the id field of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum IdField {
    Present(NodeId),
    /// Field exists but holds something other than an integer or a string
    Invalid(String),
    Missing,
}

/// A structured value exposing caller-named id, title and children fields.
///
/// The builder only reads records; `Clone` is needed because every node
/// keeps its source record as `data`.
pub trait SourceRecord: Clone {
    fn record_id(&self, key: &str) -> IdField;

    fn record_title(&self, key: &str) -> Option<String>;

    /// Nested records, or `None` when the field is absent or not a sequence.
    fn record_children(&self, key: &str) -> Option<&[Self]>;
}

impl SourceRecord for Value {
    fn record_id(&self, key: &str) -> IdField {
        match self.get(key) {
            None | Some(Value::Null) => IdField::Missing,
            Some(Value::String(id)) => IdField::Present(NodeId::Str(id.clone())),
            Some(Value::Number(number)) => match number.as_i64() {
                Some(id) => IdField::Present(NodeId::Int(id)),
                None => IdField::Invalid(number.to_string()),
            },
            Some(other) => IdField::Invalid(other.to_string()),
        }
    }

    fn record_title(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(title) => Some(title.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    fn record_children(&self, key: &str) -> Option<&[Self]> {
        self.get(key)?.as_array().map(Vec::as_slice)
    }
}
