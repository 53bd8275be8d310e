//! Outbox repository.
//!
//! The claim is a conditional transactional transition: the record is
//! re-read inside the transaction and only moved to `processing` if it is
//! still `pending` and due. Two processor instances can both fetch the same
//! due record, but only one claim commits a transition; the loser sees the
//! record already claimed and skips it.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bw_common::{DomainEvent, OutboxRecord, OutboxStatus};
use bw_store::{paths, DocumentStore, Filter, FilterOp};

use crate::backoff;

#[async_trait]
pub trait OutboxRepository: Send + Sync {
    /// Pending records whose `nextAttemptAt` has passed.
    async fn fetch_due(&self, now_ms: i64, limit: u32) -> Result<Vec<OutboxRecord>>;

    /// Conditionally move a record `pending → processing`. Returns the
    /// claimed record, or `None` if it was no longer claimable.
    async fn claim(&self, id: &str, now_ms: i64) -> Result<Option<OutboxRecord>>;

    /// Resolve a successful delivery: `processing → done`.
    async fn mark_done(&self, id: &str, now_ms: i64) -> Result<()>;

    /// Resolve a failed delivery: `processing → pending` with the backoff
    /// delay applied, or `processing → dead` at the attempt ceiling.
    /// Returns the resulting status.
    async fn mark_failed(&self, id: &str, error: &str, now_ms: i64) -> Result<OutboxStatus>;

    /// Load the domain event a record references.
    async fn load_event(&self, event_id: &str) -> Result<Option<DomainEvent>>;
}

pub struct StoreOutboxRepository {
    store: Arc<dyn DocumentStore>,
}

impl StoreOutboxRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OutboxRepository for StoreOutboxRepository {
    async fn fetch_due(&self, now_ms: i64, limit: u32) -> Result<Vec<OutboxRecord>> {
        let docs = self
            .store
            .query(
                paths::OUTBOX,
                &[
                    Filter::eq("status", "pending"),
                    Filter::new("nextAttemptAt", FilterOp::Le, now_ms),
                ],
                Some(limit as usize),
            )
            .await?;

        let mut records = Vec::with_capacity(docs.len());
        for (_, doc) in docs {
            records.push(serde_json::from_value(doc)?);
        }
        Ok(records)
    }

    async fn claim(&self, id: &str, now_ms: i64) -> Result<Option<OutboxRecord>> {
        let path = paths::outbox_record(id);
        let mut txn = self.store.transaction().await?;

        let Some(doc) = txn.get(&path).await? else {
            return Ok(None);
        };
        let mut record: OutboxRecord = serde_json::from_value(doc)?;
        if !record.is_due(now_ms) {
            // Claimed by another instance, resolved, or not yet due.
            return Ok(None);
        }

        record.begin_processing(now_ms)?;
        txn.set(&path, serde_json::to_value(&record)?);
        txn.commit().await?;
        Ok(Some(record))
    }

    async fn mark_done(&self, id: &str, now_ms: i64) -> Result<()> {
        let path = paths::outbox_record(id);
        let mut txn = self.store.transaction().await?;

        let doc = txn
            .get(&path)
            .await?
            .ok_or_else(|| anyhow::anyhow!("outbox record {} disappeared", id))?;
        let mut record: OutboxRecord = serde_json::from_value(doc)?;
        record.complete(now_ms)?;
        txn.set(&path, serde_json::to_value(&record)?);
        txn.commit().await?;
        Ok(())
    }

    async fn mark_failed(&self, id: &str, error: &str, now_ms: i64) -> Result<OutboxStatus> {
        let path = paths::outbox_record(id);
        let mut txn = self.store.transaction().await?;

        let doc = txn
            .get(&path)
            .await?
            .ok_or_else(|| anyhow::anyhow!("outbox record {} disappeared", id))?;
        let mut record: OutboxRecord = serde_json::from_value(doc)?;

        let next_at = backoff::next_attempt_at(record.attempts + 1, now_ms);
        let status = record.record_failure(error, next_at, now_ms)?;
        txn.set(&path, serde_json::to_value(&record)?);
        txn.commit().await?;
        Ok(status)
    }

    async fn load_event(&self, event_id: &str) -> Result<Option<DomainEvent>> {
        match self.store.get(&paths::domain_event(event_id)).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }
}
