//! In-memory document store.
//!
//! Transactions take the single store lock for their whole lifetime, so
//! concurrent read-modify-write transactions serialize. That realizes the
//! same guarantee the managed database offers per logical partition.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{matches, DocumentStore, Filter, Result, StoreError, Transaction};

type Documents = BTreeMap<String, Value>;

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<Documents>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents, across all collections.
    pub async fn len(&self) -> usize {
        self.data.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.lock().await.is_empty()
    }
}

fn collection_children<'a>(
    data: &'a Documents,
    collection: &str,
) -> impl Iterator<Item = (&'a String, &'a Value)> {
    let prefix = format!("{}/", collection);
    let prefix_len = prefix.len();
    data.range(prefix.clone()..)
        .take_while(move |(k, _)| k.starts_with(&prefix))
        // Direct children only, not nested subcollections.
        .filter(move |(k, _)| !k[prefix_len..].contains('/'))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        Ok(self.data.lock().await.get(path).cloned())
    }

    async fn set(&self, path: &str, doc: Value) -> Result<()> {
        self.data.lock().await.insert(path.to_string(), doc);
        Ok(())
    }

    async fn create(&self, path: &str, doc: Value) -> Result<()> {
        let mut data = self.data.lock().await;
        if data.contains_key(path) {
            return Err(StoreError::AlreadyExists {
                path: path.to_string(),
            });
        }
        data.insert(path.to_string(), doc);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.data.lock().await.remove(path);
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        limit: Option<usize>,
    ) -> Result<Vec<(String, Value)>> {
        let data = self.data.lock().await;
        let prefix_len = collection.len() + 1;
        let mut results = Vec::new();
        for (key, doc) in collection_children(&data, collection) {
            if filters.iter().all(|f| matches(doc, f)) {
                results.push((key[prefix_len..].to_string(), doc.clone()));
                if limit.is_some_and(|l| results.len() >= l) {
                    break;
                }
            }
        }
        Ok(results)
    }

    async fn transaction(&self) -> Result<Box<dyn Transaction>> {
        let guard = self.data.clone().lock_owned().await;
        Ok(Box::new(MemoryTransaction {
            guard,
            staged: Vec::new(),
        }))
    }
}

enum WriteOp {
    Set(String, Value),
    Create(String, Value),
    Delete(String),
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Documents>,
    staged: Vec<WriteOp>,
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn get(&mut self, path: &str) -> Result<Option<Value>> {
        // Read-your-writes: latest staged op for the path wins.
        for op in self.staged.iter().rev() {
            match op {
                WriteOp::Set(p, doc) | WriteOp::Create(p, doc) if p == path => {
                    return Ok(Some(doc.clone()));
                }
                WriteOp::Delete(p) if p == path => return Ok(None),
                _ => {}
            }
        }
        Ok(self.guard.get(path).cloned())
    }

    fn set(&mut self, path: &str, doc: Value) {
        self.staged.push(WriteOp::Set(path.to_string(), doc));
    }

    fn create(&mut self, path: &str, doc: Value) {
        self.staged.push(WriteOp::Create(path.to_string(), doc));
    }

    fn delete(&mut self, path: &str) {
        self.staged.push(WriteOp::Delete(path.to_string()));
    }

    async fn commit(mut self: Box<Self>) -> Result<()> {
        // Validate every create before applying anything, so a conflict
        // leaves the store untouched.
        for op in &self.staged {
            if let WriteOp::Create(path, _) = op {
                if self.guard.contains_key(path) {
                    return Err(StoreError::AlreadyExists { path: path.clone() });
                }
            }
        }
        for op in self.staged.drain(..) {
            match op {
                WriteOp::Set(path, doc) | WriteOp::Create(path, doc) => {
                    self.guard.insert(path, doc);
                }
                WriteOp::Delete(path) => {
                    self.guard.remove(&path);
                }
            }
        }
        Ok(())
    }
}
