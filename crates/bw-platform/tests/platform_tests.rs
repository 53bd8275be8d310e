//! Platform Integration Tests
//!
//! Runs the request handlers and services against the in-memory store:
//! entitlement gate ordering, event+outbox atomicity and idempotency,
//! invoice payment concurrency, and the end-to-end client and invitation
//! scenarios with their envelope shapes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::json;

use bw_common::{ApiResponse, ErrorCode};
use bw_platform::api::audit_logs;
use bw_platform::api::clients::{self, CreateClientRequest, UpdateClientRequest};
use bw_platform::api::documents::{self, RequestExtractionRequest};
use bw_platform::api::invitations::{self, CreateInvitationRequest};
use bw_platform::api::invoices::{self, CreateInvoiceRequest, RecordPaymentRequest};
use bw_platform::api::matters::{self, CreateMatterRequest};
use bw_platform::api::organizations::{self, CreateOrganizationRequest};
use bw_platform::api::tasks::{self, CreateTaskRequest};
use bw_platform::api::time_entries::{self, CreateTimeEntryRequest};
use bw_platform::api::{AppState, CallerIdentity};
use bw_platform::domain::{features, permissions, Invitation, Membership, PlanTier, Role};
use bw_platform::service::{DenyReason, EventDraft, EventService};
use bw_platform::PlatformError;
use bw_store::{
    paths, BlobStorage, DocumentStore, Filter, MemoryBlobStore, MemoryStore,
    Result as StoreResult, StoreError, Transaction,
};

fn fresh_state() -> (AppState, MemoryStore) {
    let store = MemoryStore::new();
    let state = AppState::new(Arc::new(store.clone()), Arc::new(MemoryBlobStore::default()));
    (state, store)
}

fn caller(user_id: &str) -> CallerIdentity {
    CallerIdentity::new(user_id)
}

async fn create_org(state: &AppState, founder: &str, plan: PlanTier) -> String {
    organizations::organization_create(
        state,
        &caller(founder),
        CreateOrganizationRequest {
            name: "Hale & Dorr".to_string(),
            plan: Some(plan),
            timezone: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn add_member(state: &AppState, org_id: &str, user_id: &str, role: Role) {
    state
        .memberships
        .upsert(&Membership::new(org_id, user_id, role))
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Entitlement gate ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_member_denied_with_org_member_reason_before_plan() {
    let (state, _) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Starter).await;

    // The Starter plan also lacks document OCR, but membership is the first
    // gate, so the reason must be ORG_MEMBER.
    let decision = state
        .entitlements
        .evaluate(
            "mallory",
            &org_id,
            Some(features::DOCUMENT_OCR),
            Some(permissions::CLIENTS_WRITE),
        )
        .await
        .unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.reason, Some(DenyReason::OrgMember));
}

#[tokio::test]
async fn plan_gate_reports_before_role_gate() {
    let (state, _) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Starter).await;
    add_member(&state, &org_id, "victor", Role::Viewer).await;

    // Viewer also lacks invoices:write, but the plan gate comes first.
    let decision = state
        .entitlements
        .evaluate(
            "victor",
            &org_id,
            Some(features::INVOICING),
            Some(permissions::INVOICES_WRITE),
        )
        .await
        .unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.reason, Some(DenyReason::PlanLimit));
}

#[tokio::test]
async fn role_gate_is_last() {
    let (state, _) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Professional).await;
    add_member(&state, &org_id, "victor", Role::Viewer).await;

    let decision = state
        .entitlements
        .evaluate(
            "victor",
            &org_id,
            Some(features::INVOICING),
            Some(permissions::INVOICES_WRITE),
        )
        .await
        .unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.reason, Some(DenyReason::RoleBlocked));

    let decision = state
        .entitlements
        .evaluate("alice", &org_id, Some(features::INVOICING), Some(permissions::INVOICES_WRITE))
        .await
        .unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.role, Some(Role::Owner));
}

#[tokio::test]
async fn membership_changes_take_effect_immediately() {
    let (state, store) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Starter).await;
    add_member(&state, &org_id, "bob", Role::Lawyer).await;

    let decision = state
        .entitlements
        .evaluate("bob", &org_id, None, Some(permissions::CLIENTS_WRITE))
        .await
        .unwrap();
    assert!(decision.allowed);

    // Remove the membership; the very next evaluation must deny.
    store.delete(&paths::member(&org_id, "bob")).await.unwrap();
    let decision = state
        .entitlements
        .evaluate("bob", &org_id, None, Some(permissions::CLIENTS_WRITE))
        .await
        .unwrap();
    assert_eq!(decision.reason, Some(DenyReason::OrgMember));
}

// ---------------------------------------------------------------------------
// Event + outbox atomicity and idempotency
// ---------------------------------------------------------------------------

/// Store wrapper whose transactions always fail at commit, simulating an
/// interruption before the atomic write lands.
#[derive(Clone)]
struct AbortCommitStore {
    inner: MemoryStore,
}

struct AbortTxn {
    inner: Box<dyn Transaction>,
}

#[async_trait]
impl Transaction for AbortTxn {
    async fn get(&mut self, path: &str) -> StoreResult<Option<serde_json::Value>> {
        self.inner.get(path).await
    }

    fn set(&mut self, path: &str, doc: serde_json::Value) {
        self.inner.set(path, doc);
    }

    fn create(&mut self, path: &str, doc: serde_json::Value) {
        self.inner.create(path, doc);
    }

    fn delete(&mut self, path: &str) {
        self.inner.delete(path);
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        Err(StoreError::Aborted("interrupted before commit".to_string()))
    }
}

#[async_trait]
impl DocumentStore for AbortCommitStore {
    async fn get(&self, path: &str) -> StoreResult<Option<serde_json::Value>> {
        self.inner.get(path).await
    }

    async fn set(&self, path: &str, doc: serde_json::Value) -> StoreResult<()> {
        self.inner.set(path, doc).await
    }

    async fn create(&self, path: &str, doc: serde_json::Value) -> StoreResult<()> {
        self.inner.create(path, doc).await
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        self.inner.delete(path).await
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        limit: Option<usize>,
    ) -> StoreResult<Vec<(String, serde_json::Value)>> {
        self.inner.query(collection, filters, limit).await
    }

    async fn transaction(&self) -> StoreResult<Box<dyn Transaction>> {
        Ok(Box::new(AbortTxn {
            inner: self.inner.transaction().await?,
        }))
    }
}

#[tokio::test]
async fn interrupted_emit_leaves_neither_event_nor_outbox() {
    let inner = MemoryStore::new();
    let events = EventService::new(Arc::new(AbortCommitStore {
        inner: inner.clone(),
    }));

    let result = events
        .emit(EventDraft::new(
            "org1",
            "client.created",
            "client",
            "c1",
            bw_common::Actor::user("u1"),
        ))
        .await;
    assert!(result.is_err());

    assert!(inner.query(paths::DOMAIN_EVENTS, &[], None).await.unwrap().is_empty());
    assert!(inner.query(paths::OUTBOX, &[], None).await.unwrap().is_empty());
}

#[tokio::test]
async fn emit_writes_event_and_outbox_together() {
    let (state, store) = fresh_state();
    let event = state
        .events
        .emit(EventDraft::new(
            "org1",
            "client.created",
            "client",
            "c1",
            bw_common::Actor::user("u1"),
        ))
        .await
        .unwrap();

    let stored_event = store.get(&paths::domain_event(&event.event_id)).await.unwrap();
    assert!(stored_event.is_some());
    let outbox = store
        .get(&paths::outbox_record(&bw_common::outbox_id("org1", &event.event_id)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outbox["status"], "pending");
    assert_eq!(outbox["attempts"], 0);
    assert_eq!(outbox["maxAttempts"], 5);
    assert_eq!(outbox["jobType"], "notification_dispatch");
    // Emitter default: internal audience only.
    assert_eq!(stored_event.unwrap()["visibility"]["audience"], "internal");
}

#[tokio::test]
async fn ensure_outbox_is_idempotent_per_event() {
    let (state, store) = fresh_state();

    assert!(state.events.ensure_outbox("org1", "evt-a").await.unwrap());
    // Second create for the same (orgId, eventId) pair is a no-op.
    assert!(!state.events.ensure_outbox("org1", "evt-a").await.unwrap());

    let records = store.query(paths::OUTBOX, &[], None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, "notif:org1:evt-a");
}

#[tokio::test]
async fn independent_emissions_get_distinct_outbox_records() {
    let (state, store) = fresh_state();
    let draft = EventDraft::new("org1", "client.created", "client", "c1", bw_common::Actor::user("u1"));

    let first = state.events.emit(draft.clone()).await.unwrap();
    let second = state.events.emit(draft).await.unwrap();

    assert_ne!(first.event_id, second.event_id);
    let records = store.query(paths::OUTBOX, &[], None).await.unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn oversized_payload_is_rejected() {
    let (state, _) = fresh_state();
    let draft = EventDraft::new("org1", "client.created", "client", "c1", bw_common::Actor::user("u1"))
        .with_payload(json!({ "blob": "x".repeat(20_000) }));
    let err = state.events.emit(draft).await.unwrap_err();
    assert!(matches!(err, PlatformError::Validation { .. }));
}

// ---------------------------------------------------------------------------
// Commit-then-notify: emission failure never affects the primary response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn event_emission_failure_does_not_fail_the_handler() {
    let inner = MemoryStore::new();
    let state = AppState::new(
        Arc::new(AbortCommitStore {
            inner: inner.clone(),
        }),
        Arc::new(MemoryBlobStore::default()),
    );

    // Seed tenant state directly; organization_create needs a transaction,
    // which this store deliberately breaks.
    inner
        .set(
            &paths::organization("org1"),
            serde_json::to_value(
                bw_platform::domain::Organization::new("Hale & Dorr", "alice", PlanTier::Starter),
            )
            .map(|mut v| {
                v["id"] = json!("org1");
                v
            })
            .unwrap(),
        )
        .await
        .unwrap();
    add_member(&state, "org1", "alice", Role::Owner).await;

    // The client insert is a plain create; only the event transaction fails,
    // and that failure must be swallowed.
    let response = clients::client_create(
        &state,
        &caller("alice"),
        "org1",
        CreateClientRequest {
            name: "Acme Corp".to_string(),
            email: None,
            phone: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(response.name, "Acme Corp");

    // No event or outbox document landed.
    assert!(inner.query(paths::DOMAIN_EVENTS, &[], None).await.unwrap().is_empty());
    assert!(inner.query(paths::OUTBOX, &[], None).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Invoice payment concurrency
// ---------------------------------------------------------------------------

async fn billed_invoice(state: &AppState, org_id: &str, amounts: &[i64]) -> String {
    let client = clients::client_create(
        state,
        &caller("alice"),
        org_id,
        CreateClientRequest {
            name: "Acme Corp".to_string(),
            email: None,
            phone: None,
            notes: None,
        },
    )
    .await
    .unwrap();

    let matter = matters::matter_create(
        state,
        &caller("alice"),
        org_id,
        CreateMatterRequest {
            client_id: client.id,
            title: "Acme v. Initech".to_string(),
            participants: vec![],
        },
    )
    .await
    .unwrap();

    let mut entry_ids = Vec::new();
    for amount in amounts {
        let entry = time_entries::time_entry_create(
            state,
            &caller("alice"),
            org_id,
            &matter.id,
            CreateTimeEntryRequest {
                description: "research".to_string(),
                minutes: 60,
                amount_cents: *amount,
            },
        )
        .await
        .unwrap();
        entry_ids.push(entry.id);
    }

    let invoice = invoices::invoice_create(
        state,
        &caller("alice"),
        org_id,
        CreateInvoiceRequest {
            matter_id: matter.id,
            time_entry_ids: entry_ids,
            due_date: None,
        },
    )
    .await
    .unwrap();

    invoices::invoice_send(state, &caller("alice"), org_id, &invoice.id)
        .await
        .unwrap();
    invoice.id
}

#[tokio::test]
async fn concurrent_payments_do_not_lose_updates() {
    let (state, store) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Professional).await;
    let invoice_id = billed_invoice(&state, &org_id, &[6_000, 4_000]).await;

    // Two concurrent payments, together overshooting the 10_000 total.
    let mut handles = Vec::new();
    for amount in [6_000i64, 7_000] {
        let state = state.clone();
        let org_id = org_id.clone();
        let invoice_id = invoice_id.clone();
        handles.push(tokio::spawn(async move {
            invoices::invoice_record_payment(
                &state,
                &caller("alice"),
                &org_id,
                &invoice_id,
                RecordPaymentRequest {
                    amount_cents: amount,
                },
            )
            .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let invoice = invoices::invoice_get(&state, &caller("alice"), &org_id, &invoice_id)
        .await
        .unwrap();
    assert_eq!(invoice.status, "PAID");
    // paid = min(total, 0 + 6000 + 7000)
    assert_eq!(invoice.paid_cents, 10_000);

    // The PAID transition happened exactly once.
    let paid_events = store
        .query(paths::DOMAIN_EVENTS, &[Filter::eq("eventType", "invoice.paid")], None)
        .await
        .unwrap();
    assert_eq!(paid_events.len(), 1);
}

#[tokio::test]
async fn payment_against_draft_is_an_invalid_transition() {
    let (state, _) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Professional).await;
    let client = clients::client_create(
        &state,
        &caller("alice"),
        &org_id,
        CreateClientRequest {
            name: "Acme Corp".to_string(),
            email: None,
            phone: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    let matter = matters::matter_create(
        &state,
        &caller("alice"),
        &org_id,
        CreateMatterRequest {
            client_id: client.id,
            title: "Acme v. Initech".to_string(),
            participants: vec![],
        },
    )
    .await
    .unwrap();
    let entry = time_entries::time_entry_create(
        &state,
        &caller("alice"),
        &org_id,
        &matter.id,
        CreateTimeEntryRequest {
            description: "call".to_string(),
            minutes: 30,
            amount_cents: 5_000,
        },
    )
    .await
    .unwrap();
    let invoice = invoices::invoice_create(
        &state,
        &caller("alice"),
        &org_id,
        CreateInvoiceRequest {
            matter_id: matter.id,
            time_entry_ids: vec![entry.id],
            due_date: None,
        },
    )
    .await
    .unwrap();

    let err = invoices::invoice_record_payment(
        &state,
        &caller("alice"),
        &org_id,
        &invoice.id,
        RecordPaymentRequest { amount_cents: 5_000 },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidStatusTransition);
}

#[tokio::test]
async fn invoice_creation_bills_entries_atomically() {
    let (state, _) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Professional).await;
    let invoice_id = billed_invoice(&state, &org_id, &[2_500, 7_500]).await;

    let invoice = invoices::invoice_get(&state, &caller("alice"), &org_id, &invoice_id)
        .await
        .unwrap();
    assert_eq!(invoice.total_cents, 10_000);
    assert_eq!(invoice.line_item_count, 2);

    // Every source entry is now billed.
    let matter_id = invoice.matter_id.clone();
    let unbilled = time_entries::time_entry_list_unbilled(
        &state,
        &caller("alice"),
        &org_id,
        &matter_id,
    )
    .await
    .unwrap();
    assert!(unbilled.is_empty());
}

#[tokio::test]
async fn invoicing_requires_the_plan_feature() {
    let (state, _) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Starter).await;

    let err = invoices::invoice_create(
        &state,
        &caller("alice"),
        &org_id,
        CreateInvoiceRequest {
            matter_id: "m1".to_string(),
            time_entry_ids: vec!["t1".to_string()],
            due_date: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PlanLimit);
}

// ---------------------------------------------------------------------------
// End-to-end: client lifecycle envelopes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn client_lifecycle_returns_contract_envelopes() {
    let (state, _) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Starter).await;

    let create = clients::client_create(
        &state,
        &caller("alice"),
        &org_id,
        CreateClientRequest {
            name: "Acme Corp".to_string(),
            email: None,
            phone: None,
            notes: None,
        },
    )
    .await;
    let envelope = serde_json::to_value(ApiResponse::from(create)).unwrap();
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["data"]["name"], "Acme Corp");
    // email is present and explicitly null, not omitted.
    assert!(envelope["data"].as_object().unwrap().contains_key("email"));
    assert_eq!(envelope["data"]["email"], serde_json::Value::Null);

    let client_id = envelope["data"]["id"].as_str().unwrap().to_string();
    let fetched = clients::client_get(&state, &caller("alice"), &org_id, &client_id)
        .await
        .unwrap();
    assert_eq!(fetched.name, "Acme Corp");

    clients::client_delete(&state, &caller("alice"), &org_id, &client_id)
        .await
        .unwrap();

    let after_delete = clients::client_get(&state, &caller("alice"), &org_id, &client_id).await;
    let envelope = serde_json::to_value(ApiResponse::from(after_delete)).unwrap();
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn client_delete_blocked_by_open_matters() {
    let (state, _) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Starter).await;

    let client = clients::client_create(
        &state,
        &caller("alice"),
        &org_id,
        CreateClientRequest {
            name: "Acme Corp".to_string(),
            email: None,
            phone: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    matters::matter_create(
        &state,
        &caller("alice"),
        &org_id,
        CreateMatterRequest {
            client_id: client.id.clone(),
            title: "Acme v. Initech".to_string(),
            participants: vec![],
        },
    )
    .await
    .unwrap();

    let err = clients::client_delete(&state, &caller("alice"), &org_id, &client.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn cross_org_reads_mask_as_not_found() {
    let (state, _) = fresh_state();
    let org_a = create_org(&state, "alice", PlanTier::Starter).await;
    let org_b = create_org(&state, "bob", PlanTier::Starter).await;

    let client = clients::client_create(
        &state,
        &caller("alice"),
        &org_a,
        CreateClientRequest {
            name: "Acme Corp".to_string(),
            email: None,
            phone: None,
            notes: None,
        },
    )
    .await
    .unwrap();

    // Bob is a member of org B, but the client lives in org A's subtree.
    let err = clients::client_get(&state, &caller("bob"), &org_b, &client.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn writes_require_the_role_permission() {
    let (state, _) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Starter).await;
    add_member(&state, &org_id, "victor", Role::Viewer).await;

    let err = clients::client_create(
        &state,
        &caller("victor"),
        &org_id,
        CreateClientRequest {
            name: "Acme Corp".to_string(),
            email: None,
            phone: None,
            notes: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotAuthorized);

    let err = clients::client_update(
        &state,
        &caller("mallory"),
        &org_id,
        "whatever",
        UpdateClientRequest {
            name: None,
            email: None,
            phone: None,
            notes: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotAuthorized);
}

// ---------------------------------------------------------------------------
// End-to-end: invitations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_role_is_not_invitable() {
    let (state, _) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Starter).await;

    let result = invitations::invitation_create(
        &state,
        &caller("alice"),
        &org_id,
        CreateInvitationRequest {
            role: Role::Admin,
            email: None,
            ttl_hours: None,
        },
    )
    .await;
    let envelope = serde_json::to_value(ApiResponse::from(result)).unwrap();
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn expired_invitation_rejected_without_creating_membership() {
    let (state, _) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Starter).await;

    let mut invitation = Invitation::new(&org_id, Role::Viewer, "alice", 1);
    invitation.expires_at = Utc::now() - Duration::hours(1);
    let code = invitation.code.clone();
    state.invitations.insert(&invitation).await.unwrap();

    let result = invitations::invitation_accept(&state, &caller("bob"), &code).await;
    let envelope = serde_json::to_value(ApiResponse::from(result)).unwrap();
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["error"]["code"], "VALIDATION_ERROR");
    assert!(envelope["error"]["message"]
        .as_str()
        .unwrap()
        .contains("expired"));

    // No membership was created.
    assert!(state.memberships.find(&org_id, "bob").await.unwrap().is_none());
}

#[tokio::test]
async fn valid_invitation_grants_membership_once() {
    let (state, _) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Starter).await;

    let invitation = invitations::invitation_create(
        &state,
        &caller("alice"),
        &org_id,
        CreateInvitationRequest {
            role: Role::Paralegal,
            email: Some("bob@example.com".to_string()),
            ttl_hours: Some(24),
        },
    )
    .await
    .unwrap();

    let accepted = invitations::invitation_accept(&state, &caller("bob"), &invitation.code)
        .await
        .unwrap();
    assert_eq!(accepted.organization_id, org_id);
    assert_eq!(accepted.role, Role::Paralegal);

    let membership = state.memberships.find(&org_id, "bob").await.unwrap().unwrap();
    assert_eq!(membership.role, Role::Paralegal);

    // A consumed code cannot be accepted again.
    let err = invitations::invitation_accept(&state, &caller("carol"), &invitation.code)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);
}

// ---------------------------------------------------------------------------
// Document extraction jobs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn extraction_request_is_gated_and_queued() {
    let store = MemoryStore::new();
    let blobs = MemoryBlobStore::default();
    let state = AppState::new(Arc::new(store.clone()), Arc::new(blobs.clone()));
    let org_id = create_org(&state, "alice", PlanTier::Enterprise).await;

    blobs
        .save("org/brief.pdf", vec![1, 2, 3], "application/pdf")
        .await
        .unwrap();

    let job = documents::document_extraction_request(
        &state,
        &caller("alice"),
        &org_id,
        RequestExtractionRequest {
            blob_key: "org/brief.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            matter_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(job.status, "QUEUED");

    let events = store
        .query(
            paths::DOMAIN_EVENTS,
            &[Filter::eq("eventType", "document.extraction_requested")],
            None,
        )
        .await
        .unwrap();
    assert_eq!(events.len(), 1);

    let url = documents::document_signed_url(&state, &caller("alice"), &org_id, &job.id)
        .await
        .unwrap();
    assert!(url.url.contains("org/brief.pdf"));
}

#[tokio::test]
async fn disallowed_content_type_is_a_safety_error() {
    let store = MemoryStore::new();
    let blobs = MemoryBlobStore::default();
    let state = AppState::new(Arc::new(store), Arc::new(blobs.clone()));
    let org_id = create_org(&state, "alice", PlanTier::Enterprise).await;

    blobs
        .save("org/tool.exe", vec![0x4d, 0x5a], "application/x-msdownload")
        .await
        .unwrap();

    let err = documents::document_extraction_request(
        &state,
        &caller("alice"),
        &org_id,
        RequestExtractionRequest {
            blob_key: "org/tool.exe".to_string(),
            content_type: "application/x-msdownload".to_string(),
            matter_id: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::SafetyError);
}

#[tokio::test]
async fn extraction_needs_the_document_ocr_feature() {
    let (state, _) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Professional).await;

    let err = documents::document_extraction_request(
        &state,
        &caller("alice"),
        &org_id,
        RequestExtractionRequest {
            blob_key: "org/brief.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            matter_id: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PlanLimit);
}

#[tokio::test]
async fn mutations_leave_an_audit_trail_readable_by_admins_only() {
    let (state, _) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Starter).await;
    add_member(&state, &org_id, "victor", Role::Viewer).await;

    clients::client_create(
        &state,
        &caller("alice"),
        &org_id,
        CreateClientRequest {
            name: "Acme Corp".to_string(),
            email: None,
            phone: None,
            notes: None,
        },
    )
    .await
    .unwrap();

    let trail = audit_logs::audit_trail_list(&state, &caller("alice"), &org_id)
        .await
        .unwrap();
    // Organization creation plus the client creation.
    assert_eq!(trail.len(), 2);
    assert!(trail.iter().any(|e| e.entity_type == "Client" && e.action == "CREATE"));

    let err = audit_logs::audit_trail_list(&state, &caller("victor"), &org_id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotAuthorized);
}

#[tokio::test]
async fn blank_org_id_is_org_required() {
    let (state, _) = fresh_state();
    let err = clients::client_list(&state, &caller("alice"), "  ")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::OrgRequired);
}

// ---------------------------------------------------------------------------
// Tasks: assignee and due-date rules
// ---------------------------------------------------------------------------

#[tokio::test]
async fn task_assignee_rules_surface_distinct_codes() {
    let (state, _) = fresh_state();
    let org_id = create_org(&state, "alice", PlanTier::Professional).await;
    add_member(&state, &org_id, "bob", Role::Lawyer).await;

    let client = clients::client_create(
        &state,
        &caller("alice"),
        &org_id,
        CreateClientRequest {
            name: "Acme Corp".to_string(),
            email: None,
            phone: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    let matter = matters::matter_create(
        &state,
        &caller("alice"),
        &org_id,
        CreateMatterRequest {
            client_id: client.id,
            title: "Acme v. Initech".to_string(),
            participants: vec![],
        },
    )
    .await
    .unwrap();

    let due = Utc::now() + Duration::days(7);

    // Not an org member at all.
    let err = tasks::task_create(
        &state,
        &caller("alice"),
        &org_id,
        CreateTaskRequest {
            matter_id: matter.id.clone(),
            title: "File motion".to_string(),
            assignee_id: "mallory".to_string(),
            due_date: due,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AssigneeNotMember);

    // A member, but not a participant on this matter.
    let err = tasks::task_create(
        &state,
        &caller("alice"),
        &org_id,
        CreateTaskRequest {
            matter_id: matter.id.clone(),
            title: "File motion".to_string(),
            assignee_id: "bob".to_string(),
            due_date: due,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AssigneeNotCaseParticipant);

    // Due date in the past.
    let err = tasks::task_create(
        &state,
        &caller("alice"),
        &org_id,
        CreateTaskRequest {
            matter_id: matter.id.clone(),
            title: "File motion".to_string(),
            assignee_id: "alice".to_string(),
            due_date: Utc::now() - Duration::days(1),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidDueDate);

    // The matter creator is a participant; creation succeeds.
    let task = tasks::task_create(
        &state,
        &caller("alice"),
        &org_id,
        CreateTaskRequest {
            matter_id: matter.id,
            title: "File motion".to_string(),
            assignee_id: "alice".to_string(),
            due_date: due,
        },
    )
    .await
    .unwrap();
    assert_eq!(task.status, "OPEN");
}
