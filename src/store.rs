//! Persistence boundary. The pipeline reads raw posts and sidebar dumps from a
//! `Store` and writes each output collection back as keyed JSON documents.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{EcdError, Result};

pub type Document = (String, Value);

pub trait Store {
    /// Raw post payloads as `(id, json)`, ordered by id.
    fn load_post_records(&self) -> Result<Vec<(String, String)>>;

    /// Sidebar text dumps in import order.
    fn load_sidebar(&self) -> Result<Vec<String>>;

    fn put_post_record(&mut self, id: &str, payload: &str) -> Result<()>;

    fn put_sidebar(&mut self, text: &str) -> Result<()>;

    /// Replace a whole collection.
    fn write_collection(&mut self, name: &str, docs: Vec<Document>) -> Result<usize>;

    fn read_collection(&self, name: &str) -> Result<Vec<Document>>;

    fn read_document(&self, name: &str, key: &str) -> Result<Option<Value>> {
        Ok(self
            .read_collection(name)?
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v))
    }
}

/// In-memory store, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    posts: BTreeMap<String, String>,
    sidebar: Vec<String>,
    collections: BTreeMap<String, Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn load_post_records(&self) -> Result<Vec<(String, String)>> {
        let mut rows: Vec<_> = self
            .posts
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        rows.sort_by_key(|(k, _)| (k.parse::<i64>().unwrap_or(i64::MAX), k.clone()));
        Ok(rows)
    }

    fn load_sidebar(&self) -> Result<Vec<String>> {
        Ok(self.sidebar.clone())
    }

    fn put_post_record(&mut self, id: &str, payload: &str) -> Result<()> {
        self.posts.insert(id.to_string(), payload.to_string());
        Ok(())
    }

    fn put_sidebar(&mut self, text: &str) -> Result<()> {
        self.sidebar.push(text.to_string());
        Ok(())
    }

    fn write_collection(&mut self, name: &str, docs: Vec<Document>) -> Result<usize> {
        let n = docs.len();
        self.collections.insert(name.to_string(), docs);
        Ok(n)
    }

    fn read_collection(&self, name: &str) -> Result<Vec<Document>> {
        self.collections
            .get(name)
            .cloned()
            .ok_or_else(|| EcdError::MissingCollection(name.to_string()))
    }
}
