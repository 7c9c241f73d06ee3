//! In-process [`Store`] for tests and throwaway sessions.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use super::{Collection, Record, Store};
use crate::error::{Error, Result};

/// A [`Store`] backed by ordered maps in memory.
///
/// Documents go through the same JSON encoding as [`super::SqliteStore`],
/// so decoding rules (such as defaulted fields) behave identically.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RefCell<HashMap<Collection, BTreeMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw JSON document, bypassing encoding.
    pub fn put_raw(&self, collection: Collection, key: &str, body: &str) {
        self.collections
            .borrow_mut()
            .entry(collection)
            .or_default()
            .insert(key.to_string(), body.to_string());
    }

    /// Number of documents in a collection.
    #[must_use]
    pub fn len(&self, collection: Collection) -> usize {
        self.collections
            .borrow()
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }
}

impl Store for MemoryStore {
    fn get<R: Record>(&self, key: &str) -> Result<Option<R>> {
        let collections = self.collections.borrow();
        let body = collections.get(&R::COLLECTION).and_then(|c| c.get(key));
        match body {
            Some(body) => Ok(Some(serde_json::from_str(body)?)),
            None => Ok(None),
        }
    }

    fn get_all<R: Record>(&self) -> Result<Vec<R>> {
        let collections = self.collections.borrow();
        let Some(collection) = collections.get(&R::COLLECTION) else {
            return Ok(Vec::new());
        };
        collection
            .values()
            .map(|body| serde_json::from_str(body).map_err(Error::from))
            .collect()
    }

    fn put<R: Record>(&self, record: &R) -> Result<()> {
        let body = serde_json::to_string(record)?;
        self.put_raw(R::COLLECTION, record.key(), &body);
        Ok(())
    }

    fn delete<R: Record>(&self, key: &str) -> Result<()> {
        if let Some(collection) = self.collections.borrow_mut().get_mut(&R::COLLECTION) {
            collection.remove(key);
        }
        Ok(())
    }

    fn clear<R: Record>(&self) -> Result<()> {
        self.collections.borrow_mut().remove(&R::COLLECTION);
        Ok(())
    }
}
