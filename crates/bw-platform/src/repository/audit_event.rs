//! Audit Event Repository

use std::sync::Arc;

use bw_store::{paths, DocumentStore};

use super::{from_doc, to_doc};
use crate::domain::AuditEvent;
use crate::error::Result;

pub struct AuditEventRepository {
    store: Arc<dyn DocumentStore>,
}

impl AuditEventRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Append-only; audit records are never updated or deleted.
    pub async fn insert(&self, event: &AuditEvent) -> Result<()> {
        self.store
            .create(
                &paths::audit_event(&event.organization_id, &event.id),
                to_doc(event)?,
            )
            .await?;
        Ok(())
    }

    pub async fn list_by_org(&self, org_id: &str) -> Result<Vec<AuditEvent>> {
        let docs = self
            .store
            .query(&paths::audit_events(org_id), &[], None)
            .await?;
        docs.into_iter().map(|(_, doc)| from_doc(doc)).collect()
    }
}
