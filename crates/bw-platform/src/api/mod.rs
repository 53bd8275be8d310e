//! API Layer
//!
//! axum routers and handlers. Each endpoint wraps a core handler function
//! (`client_create`, `invoice_record_payment`, ...) that does the actual
//! validate → entitle → mutate → audit/emit sequence and returns a
//! `Result`; the wrapper folds that into the uniform envelope.

pub mod audit_logs;
pub mod clients;
pub mod comments;
pub mod common;
pub mod documents;
pub mod invitations;
pub mod invoices;
pub mod matters;
pub mod openapi;
pub mod organizations;
pub mod tasks;
pub mod time_entries;

pub use common::{AppState, Caller, CallerIdentity, CALLER_HEADER};
pub use openapi::PlatformApiDoc;

use axum::routing::{get, post};
use axum::Router;

/// Assemble the platform router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/orgs", post(organizations::create_organization))
        .route("/orgs/:org_id", get(organizations::get_organization))
        .route("/orgs/:org_id/audit", get(audit_logs::list_audit_trail))
        .route(
            "/orgs/:org_id/clients",
            post(clients::create_client).get(clients::list_clients),
        )
        .route(
            "/orgs/:org_id/clients/:id",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        .route(
            "/orgs/:org_id/matters",
            post(matters::create_matter).get(matters::list_matters),
        )
        .route("/orgs/:org_id/matters/:matter_id", get(matters::get_matter))
        .route(
            "/orgs/:org_id/matters/:matter_id/comments",
            post(comments::add_comment).get(comments::list_comments),
        )
        .route(
            "/orgs/:org_id/matters/:matter_id/time-entries",
            post(time_entries::create_time_entry).get(time_entries::list_unbilled_time_entries),
        )
        .route(
            "/orgs/:org_id/invitations",
            post(invitations::create_invitation),
        )
        .route(
            "/invitations/:code/accept",
            post(invitations::accept_invitation),
        )
        .route("/orgs/:org_id/invoices", post(invoices::create_invoice))
        .route("/orgs/:org_id/invoices/:id", get(invoices::get_invoice))
        .route("/orgs/:org_id/invoices/:id/send", post(invoices::send_invoice))
        .route(
            "/orgs/:org_id/invoices/:id/payments",
            post(invoices::record_payment),
        )
        .route("/orgs/:org_id/tasks", post(tasks::create_task))
        .route(
            "/orgs/:org_id/tasks/:id/status",
            post(tasks::update_task_status),
        )
        .route(
            "/orgs/:org_id/documents/extract",
            post(documents::request_extraction),
        )
        .route(
            "/orgs/:org_id/documents/:job_id/url",
            get(documents::get_signed_url),
        )
        .with_state(state)
}
