//! Audit Service
//!
//! Appends immutable audit records under the organization's trail.
//! Best-effort: a failed audit write never rolls back or fails the primary
//! mutation that already committed. The failure is logged for monitoring.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::{AuditAction, AuditEvent};
use crate::repository::AuditEventRepository;

#[derive(Clone)]
pub struct AuditService {
    repo: Arc<AuditEventRepository>,
}

impl AuditService {
    pub fn new(repo: Arc<AuditEventRepository>) -> Self {
        Self { repo }
    }

    pub async fn record(
        &self,
        organization_id: &str,
        actor_id: &str,
        action: AuditAction,
        entity_type: &str,
        entity_id: &str,
        metadata: Option<serde_json::Value>,
    ) {
        let mut event = AuditEvent::new(organization_id, actor_id, action, entity_type, entity_id);
        if let Some(metadata) = metadata {
            event = event.with_metadata(metadata);
        }
        self.insert(event).await;
    }

    pub async fn log_create(&self, org_id: &str, actor_id: &str, entity_type: &str, entity_id: &str) {
        self.record(org_id, actor_id, AuditAction::Create, entity_type, entity_id, None)
            .await;
    }

    pub async fn log_update(&self, org_id: &str, actor_id: &str, entity_type: &str, entity_id: &str) {
        self.record(org_id, actor_id, AuditAction::Update, entity_type, entity_id, None)
            .await;
    }

    pub async fn log_delete(&self, org_id: &str, actor_id: &str, entity_type: &str, entity_id: &str) {
        self.record(org_id, actor_id, AuditAction::Delete, entity_type, entity_id, None)
            .await;
    }

    async fn insert(&self, event: AuditEvent) {
        info!(
            action = ?event.action,
            entity_type = %event.entity_type,
            entity_id = %event.entity_id,
            actor_id = %event.actor_id,
            "audit event recorded"
        );

        if let Err(e) = self.repo.insert(&event).await {
            // The primary mutation already committed; do not fail it.
            error!(error = %e, "failed to insert audit event");
        }
    }
}
