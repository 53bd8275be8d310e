//! Common API types and utilities
//!
//! Handlers are invoked as authenticated RPCs: identity verification happens
//! upstream, and the authenticating proxy installs the verified caller id in
//! the `x-caller-id` header. Every handler returns the uniform envelope.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use bw_common::{ApiErrorBody, ApiResponse, ErrorCode};
use bw_store::{BlobStorage, DocumentStore};

use crate::error::{PlatformError, Result};
use crate::repository::{
    AuditEventRepository, ClientRepository, CommentRepository, DocumentJobRepository,
    InvitationRepository, InvoiceRepository, MatterRepository, MembershipRepository,
    OrganizationRepository, TaskRepository, TimeEntryRepository,
};
use crate::service::{AuditService, EntitlementService, EventService};

/// Header carrying the verified caller id, set by the authenticating proxy.
pub const CALLER_HEADER: &str = "x-caller-id";

/// Verified caller identity. Authentication itself is delegated; by the time
/// a handler runs, the identity has already been established.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub user_id: String,
}

impl CallerIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Extractor for the verified caller.
pub struct Caller(pub CallerIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        let caller = parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty());

        match caller {
            Some(user_id) => Ok(Caller(CallerIdentity::new(user_id))),
            None => {
                let body: ApiResponse<()> = ApiResponse::error(ApiErrorBody::new(
                    ErrorCode::NotAuthorized,
                    "missing verified caller identity",
                ));
                Err((StatusCode::UNAUTHORIZED, Json(body)).into_response())
            }
        }
    }
}

/// Shared handler state: the storage ports, repositories, and services.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStorage>,
    pub orgs: Arc<OrganizationRepository>,
    pub memberships: Arc<MembershipRepository>,
    pub clients: Arc<ClientRepository>,
    pub matters: Arc<MatterRepository>,
    pub time_entries: Arc<TimeEntryRepository>,
    pub comments: Arc<CommentRepository>,
    pub invitations: Arc<InvitationRepository>,
    pub invoices: Arc<InvoiceRepository>,
    pub tasks: Arc<TaskRepository>,
    pub document_jobs: Arc<DocumentJobRepository>,
    pub audit_events: Arc<AuditEventRepository>,
    pub entitlements: Arc<EntitlementService>,
    pub audit: Arc<AuditService>,
    pub events: Arc<EventService>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStorage>) -> Self {
        let orgs = Arc::new(OrganizationRepository::new(store.clone()));
        let memberships = Arc::new(MembershipRepository::new(store.clone()));
        let entitlements = Arc::new(EntitlementService::new(orgs.clone(), memberships.clone()));
        let audit_events = Arc::new(AuditEventRepository::new(store.clone()));
        let audit = Arc::new(AuditService::new(audit_events.clone()));
        let events = Arc::new(EventService::new(store.clone()));
        Self {
            orgs,
            memberships,
            clients: Arc::new(ClientRepository::new(store.clone())),
            matters: Arc::new(MatterRepository::new(store.clone())),
            time_entries: Arc::new(TimeEntryRepository::new(store.clone())),
            comments: Arc::new(CommentRepository::new(store.clone())),
            invitations: Arc::new(InvitationRepository::new(store.clone())),
            invoices: Arc::new(InvoiceRepository::new(store.clone())),
            tasks: Arc::new(TaskRepository::new(store.clone())),
            document_jobs: Arc::new(DocumentJobRepository::new(store.clone())),
            audit_events,
            entitlements,
            audit,
            events,
            store,
            blobs,
        }
    }
}

pub fn require_org(org_id: &str) -> Result<()> {
    if org_id.trim().is_empty() {
        return Err(PlatformError::OrgRequired);
    }
    Ok(())
}

pub fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PlatformError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub fn require_max_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(PlatformError::validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}
