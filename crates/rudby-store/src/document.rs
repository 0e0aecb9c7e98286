use std::collections::BTreeMap;

use rudby_types::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored document: a store-assigned id plus a JSON object body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: RecordId,
    pub body: Map<String, Value>,
}

impl Document {
    pub fn new(id: RecordId, body: Map<String, Value>) -> Self {
        Self { id, body }
    }
}

/// Conjunction of equality conditions over a document.
///
/// Field conditions compare top-level body fields for exact JSON equality.
/// An empty filter matches every document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    id: Option<RecordId>,
    fields: BTreeMap<String, Value>,
}

impl Filter {
    /// Match every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match the document with this id.
    pub fn by_id(id: RecordId) -> Self {
        Self {
            id: Some(id),
            fields: BTreeMap::new(),
        }
    }

    /// Match documents whose `field` equals `value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    /// Add another equality condition.
    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.fields.is_empty()
    }

    pub fn matches(&self, document: &Document) -> bool {
        if let Some(id) = &self.id {
            if document.id != *id {
                return false;
            }
        }
        self.fields
            .iter()
            .all(|(field, expected)| document.body.get(field) == Some(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(body: Value) -> Document {
        match body {
            Value::Object(map) => Document::new(RecordId::new(), map),
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::all().is_empty());
        assert!(Filter::all().matches(&doc(json!({}))));
        assert!(Filter::all().matches(&doc(json!({"type": "ring"}))));
    }

    #[test]
    fn field_equality() {
        let ring = doc(json!({"type": "ring", "collection": "Aurora"}));
        assert!(Filter::eq("type", "ring").matches(&ring));
        assert!(!Filter::eq("type", "necklace").matches(&ring));
        assert!(!Filter::eq("stone", "ruby").matches(&ring));
    }

    #[test]
    fn conditions_are_conjunctive() {
        let ring = doc(json!({"type": "ring", "collection": "Aurora"}));
        assert!(Filter::eq("type", "ring").and("collection", "Aurora").matches(&ring));
        assert!(!Filter::eq("type", "ring").and("collection", "Winter").matches(&ring));
    }

    #[test]
    fn equality_is_type_strict() {
        let d = doc(json!({"serialNumber": 7}));
        assert!(Filter::eq("serialNumber", 7).matches(&d));
        assert!(!Filter::eq("serialNumber", "7").matches(&d));
    }

    #[test]
    fn by_id_matches_only_that_document() {
        let a = doc(json!({}));
        let b = doc(json!({}));
        let filter = Filter::by_id(a.id);
        assert!(filter.matches(&a));
        assert!(!filter.matches(&b));
    }
}
