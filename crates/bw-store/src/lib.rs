//! Document store port.
//!
//! The platform talks to its document database exclusively through the
//! [`DocumentStore`] trait: per-document reads/writes, simple filtered
//! queries over one collection, and multi-document transactions with staged
//! writes and all-or-nothing commit. The in-memory implementation in
//! [`memory`] backs the test suite and the dev server; production backends
//! implement the same trait.

pub mod blob;
pub mod memory;
pub mod paths;

use async_trait::async_trait;
use serde_json::Value;

pub use blob::{BlobStorage, MemoryBlobStore};
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document already exists: {path}")]
    AlreadyExists { path: String },

    #[error("document not found: {path}")]
    NotFound { path: String },

    #[error("transaction aborted: {0}")]
    Aborted(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Comparison operator for query filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A single field filter. Dotted field names traverse nested objects.
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Le, value)
    }

    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Ge, value)
    }
}

/// Document database port.
///
/// Paths are slash-separated, alternating collection and document id
/// segments (`organizations/{orgId}/clients/{id}`). Queries scan the direct
/// children of one collection path.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &str) -> Result<Option<Value>>;

    /// Unconditional upsert.
    async fn set(&self, path: &str, doc: Value) -> Result<()>;

    /// Create-only write. Fails with [`StoreError::AlreadyExists`] when the
    /// document is already present.
    async fn create(&self, path: &str, doc: Value) -> Result<()>;

    async fn delete(&self, path: &str) -> Result<()>;

    /// Equality/range query over the direct children of `collection`.
    /// Results are keyed by document id and ordered by id.
    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        limit: Option<usize>,
    ) -> Result<Vec<(String, Value)>>;

    /// Begin a transaction. The handle holds exclusive write access until it
    /// is committed or dropped; dropping without commit discards every
    /// staged write.
    async fn transaction(&self) -> Result<Box<dyn Transaction>>;
}

/// A transaction over the document store.
///
/// Reads observe writes staged earlier in the same transaction. `commit`
/// applies all staged writes atomically; a failed commit applies none.
#[async_trait]
pub trait Transaction: Send {
    async fn get(&mut self, path: &str) -> Result<Option<Value>>;

    fn set(&mut self, path: &str, doc: Value);

    /// Staged create-only write; commit fails if the document exists.
    fn create(&mut self, path: &str, doc: Value);

    fn delete(&mut self, path: &str);

    async fn commit(self: Box<Self>) -> Result<()>;
}

/// Ordering over the JSON scalar types filters operate on. Numbers compare
/// numerically, strings lexicographically; mixed types never match.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64()?;
            let y = y.as_f64()?;
            x.partial_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

pub(crate) fn field_value<'a>(doc: &'a Value, field: &str) -> Option<&'a Value> {
    let mut current = doc;
    for part in field.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

pub(crate) fn matches(doc: &Value, filter: &Filter) -> bool {
    let Some(actual) = field_value(doc, &filter.field) else {
        return false;
    };
    let Some(ordering) = compare_values(actual, &filter.value) else {
        return false;
    };
    match filter.op {
        FilterOp::Eq => ordering.is_eq(),
        FilterOp::Lt => ordering.is_lt(),
        FilterOp::Le => ordering.is_le(),
        FilterOp::Gt => ordering.is_gt(),
        FilterOp::Ge => ordering.is_ge(),
    }
}
