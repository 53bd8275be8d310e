//! Outbox dispatch processor.
//!
//! Drains the outbox with an at-least-once guarantee inside a bounded retry
//! budget: claim a due record with a conditional `pending → processing`
//! transition, load the referenced event, attempt delivery, then resolve to
//! `done`, re-queue with backoff, or dead-letter at the attempt ceiling.
//! Terminal records persist for observability.

pub mod backoff;
pub mod dispatcher;
pub mod repository;

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

pub use dispatcher::{
    DispatchResult, HttpDispatcherConfig, HttpNotificationDispatcher, NotificationDispatcher,
    SIGNATURE_HEADER,
};
pub use repository::{OutboxRepository, StoreOutboxRepository};

use bw_common::OutboxStatus;

pub struct OutboxProcessor {
    repository: Arc<dyn OutboxRepository>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    instance_id: String,
    poll_interval: Duration,
    batch_size: u32,
}

impl OutboxProcessor {
    pub fn new(
        repository: Arc<dyn OutboxRepository>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        poll_interval: Duration,
        batch_size: u32,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            instance_id: uuid::Uuid::new_v4().to_string(),
            poll_interval,
            batch_size,
        }
    }

    pub async fn start(&self) {
        info!(instance_id = %self.instance_id, "starting outbox processor");
        loop {
            if let Err(e) = self.process_once(Utc::now().timestamp_millis()).await {
                error!("error processing outbox batch: {}", e);
            }
            sleep(self.poll_interval).await;
        }
    }

    /// One poll cycle at the given instant. Exposed separately from the loop
    /// so the retry/dead-letter schedule can be exercised deterministically.
    pub async fn process_once(&self, now_ms: i64) -> Result<usize> {
        let due = self.repository.fetch_due(now_ms, self.batch_size).await?;
        if due.is_empty() {
            return Ok(0);
        }

        let mut processed = 0;
        for record in due {
            // The claim is the mutual-exclusion point; a concurrent instance
            // that lost the race sees None and moves on.
            let Some(claimed) = self.repository.claim(&record.id, now_ms).await? else {
                debug!(id = %record.id, "outbox record no longer claimable, skipping");
                continue;
            };

            processed += 1;
            match self.repository.load_event(&claimed.event_id).await? {
                Some(event) => match self.dispatcher.dispatch(&event).await {
                    DispatchResult::Success => {
                        self.repository.mark_done(&claimed.id, now_ms).await?;
                        debug!(id = %claimed.id, "outbox record done");
                    }
                    DispatchResult::Failure { error } => {
                        let status = self
                            .repository
                            .mark_failed(&claimed.id, &error, now_ms)
                            .await?;
                        if status == OutboxStatus::Dead {
                            warn!(id = %claimed.id, %error, "outbox record dead-lettered");
                        } else {
                            debug!(id = %claimed.id, %error, "outbox delivery failed, re-queued");
                        }
                    }
                },
                None => {
                    // Should be unreachable given the atomic event+outbox
                    // write; treated as a failed attempt so it still bounds.
                    let status = self
                        .repository
                        .mark_failed(&claimed.id, "referenced event not found", now_ms)
                        .await?;
                    error!(id = %claimed.id, event_id = %claimed.event_id, ?status, "outbox record references missing event");
                }
            }
        }
        Ok(processed)
    }
}
