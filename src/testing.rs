//! Testing utilities and mock implementations.
//!
//! These types are provided for use in tests. They may appear unused in
//! the library itself but are consumed by unit and integration tests.

#![allow(dead_code)]

use crate::error::Result;
use crate::partition::PartitionKey;
use crate::store::DocumentStore;
use crate::tree::models::TaskNode;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// An in-memory document store for testing.
///
/// Documents are kept per partition key; failure injection flags make the
/// abort semantics of cross-partition operations testable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RefCell<HashMap<String, Vec<TaskNode>>>,
    fail_fetch: Cell<bool>,
    fail_upsert: Cell<bool>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a partition's document.
    pub fn seed(&self, key: &PartitionKey, nodes: Vec<TaskNode>) {
        self.documents
            .borrow_mut()
            .insert(key.storage_key(), nodes);
    }

    /// Get a copy of a partition's stored document, if any.
    #[must_use]
    pub fn document(&self, key: &PartitionKey) -> Option<Vec<TaskNode>> {
        self.documents.borrow().get(&key.storage_key()).cloned()
    }

    /// Make every subsequent fetch fail.
    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.set(fail);
    }

    /// Make every subsequent upsert fail.
    pub fn set_fail_upsert(&self, fail: bool) {
        self.fail_upsert.set(fail);
    }
}

impl DocumentStore for MemoryStore {
    fn fetch_document(&self, key: &PartitionKey) -> Result<Option<Vec<TaskNode>>> {
        if self.fail_fetch.get() {
            return Err(std::io::Error::other("injected fetch failure").into());
        }
        Ok(self.document(key))
    }

    fn upsert_document(&self, key: &PartitionKey, nodes: &[TaskNode]) -> Result<()> {
        if self.fail_upsert.get() {
            return Err(std::io::Error::other("injected upsert failure").into());
        }
        self.seed(key, nodes.to_vec());
        Ok(())
    }

    fn delete_document(&self, key: &PartitionKey) -> Result<bool> {
        Ok(self
            .documents
            .borrow_mut()
            .remove(&key.storage_key())
            .is_some())
    }
}
