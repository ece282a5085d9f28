//! Document store collaborator used by the UTXO index
//!
//! The index only needs a small key/document contract: create (failing on an
//! existing key), get, batch update, delete (failing on a missing key) and a
//! query by key prefix and field values. [`MemoryStore`] implements it over a
//! `BTreeMap`, so queries return documents in key order.

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Document conflict: {0}")]
    Conflict(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// A keyed JSON document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, body: Value) -> Self {
        Document {
            id: id.into(),
            body,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Equals { field: String, value: Value },
    ElemMatch { array: String, field: String, value: Value },
}

/// Selector over documents: an optional key prefix plus field conditions, all of which must hold
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    key_prefix: Option<String>,
    conditions: Vec<Condition>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Require `body[field] == value`
    pub fn field_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.conditions.push(Condition::Equals {
            field: field.into(),
            value,
        });
        self
    }

    /// Require some element of the array `body[array]` to have `element[field] == value`
    pub fn elem_match(mut self, array: impl Into<String>, field: impl Into<String>, value: Value) -> Self {
        self.conditions.push(Condition::ElemMatch {
            array: array.into(),
            field: field.into(),
            value,
        });
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        if let Some(prefix) = &self.key_prefix {
            if !doc.id.starts_with(prefix.as_str()) {
                return false;
            }
        }

        self.conditions.iter().all(|condition| match condition {
            Condition::Equals { field, value } => doc.get(field) == Some(value),
            Condition::ElemMatch { array, field, value } => doc
                .get(array)
                .and_then(Value::as_array)
                .map(|items| items.iter().any(|item| item.get(field) == Some(value)))
                .unwrap_or(false),
        })
    }
}

/// Key/document persistence consumed by the ledger
pub trait DocumentStore {
    /// Insert a new document; fails with [`StoreError::Conflict`] if `key` exists
    fn create(&mut self, key: &str, body: Value) -> Result<Document, StoreError>;

    fn get(&self, key: &str) -> Result<Option<Document>, StoreError>;

    /// Write each document under its id, replacing any existing body
    fn update(&mut self, docs: &[Document]) -> Result<(), StoreError>;

    /// Remove a document; fails with [`StoreError::NotFound`] if it is gone
    fn delete(&mut self, doc: &Document) -> Result<(), StoreError>;

    fn find(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

/// In-process document store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    docs: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.docs.keys().map(String::as_str)
    }
}

impl DocumentStore for MemoryStore {
    fn create(&mut self, key: &str, body: Value) -> Result<Document, StoreError> {
        if self.docs.contains_key(key) {
            return Err(StoreError::Conflict(key.to_string()));
        }
        self.docs.insert(key.to_string(), body.clone());
        Ok(Document::new(key, body))
    }

    fn get(&self, key: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.docs.get(key).map(|body| Document::new(key, body.clone())))
    }

    fn update(&mut self, docs: &[Document]) -> Result<(), StoreError> {
        for doc in docs {
            self.docs.insert(doc.id.clone(), doc.body.clone());
        }
        Ok(())
    }

    fn delete(&mut self, doc: &Document) -> Result<(), StoreError> {
        self.docs
            .remove(&doc.id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(doc.id.clone()))
    }

    fn find(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let docs = match &query.key_prefix {
            Some(prefix) => self
                .docs
                .range(prefix.clone()..)
                .take_while(|(key, _)| key.starts_with(prefix.as_str()))
                .map(|(key, body)| Document::new(key.clone(), body.clone()))
                .filter(|doc| query.matches(doc))
                .collect(),
            None => self
                .docs
                .iter()
                .map(|(key, body)| Document::new(key.clone(), body.clone()))
                .filter(|doc| query.matches(doc))
                .collect(),
        };
        Ok(docs)
    }
}
