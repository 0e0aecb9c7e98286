//! Backend-independent store state shared by the memory and file stores.

use std::collections::BTreeMap;

use rudby_types::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::{Document, Filter};
use crate::error::{StoreError, StoreResult};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    counters: BTreeMap<String, u64>,
    /// Documents per collection, kept in insertion order.
    collections: BTreeMap<String, Vec<Document>>,
}

impl StoreState {
    pub(crate) fn increment(&mut self, counter_key: &str) -> StoreResult<u64> {
        let current = self.counters.entry(counter_key.to_string()).or_insert(0);
        *current = current
            .checked_add(1)
            .ok_or_else(|| StoreError::CounterOverflow(counter_key.to_string()))?;
        Ok(*current)
    }

    pub(crate) fn counter(&self, counter_key: &str) -> Option<u64> {
        self.counters.get(counter_key).copied()
    }

    pub(crate) fn set_counter(&mut self, counter_key: &str, value: u64) {
        self.counters.insert(counter_key.to_string(), value);
    }

    pub(crate) fn insert(&mut self, collection: &str, body: Map<String, Value>) -> RecordId {
        let id = RecordId::new();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id, body));
        id
    }

    pub(crate) fn find_one(&self, collection: &str, filter: &Filter) -> Option<Document> {
        self.documents(collection)
            .iter()
            .find(|doc| filter.matches(doc))
            .cloned()
    }

    pub(crate) fn find_many(&self, collection: &str, filter: &Filter) -> Vec<Document> {
        self.documents(collection)
            .iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect()
    }

    pub(crate) fn replace(
        &mut self,
        collection: &str,
        id: &RecordId,
        body: Map<String, Value>,
    ) -> bool {
        let Some(docs) = self.collections.get_mut(collection) else {
            return false;
        };
        match docs.iter_mut().find(|doc| doc.id == *id) {
            Some(doc) => {
                doc.body = body;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, collection: &str, id: &RecordId) -> bool {
        let Some(docs) = self.collections.get_mut(collection) else {
            return false;
        };
        let before = docs.len();
        docs.retain(|doc| doc.id != *id);
        docs.len() != before
    }

    pub(crate) fn len(&self, collection: &str) -> usize {
        self.documents(collection).len()
    }

    fn documents(&self, collection: &str) -> &[Document] {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
