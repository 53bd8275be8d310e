//! Invoices API
//!
//! Invoice creation bills N time entries and writes the invoice with its
//! line items in one transaction, so a failure leaves no entry half-billed.
//! Payment recording re-reads the invoice inside a transaction to compute
//! the new paid total and status atomically; concurrent payments cannot
//! lose updates.

use axum::extract::{Path, State};
use axum::Json;
use bw_common::{Actor, ApiResponse};
use bw_store::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::common::{require_org, AppState, Caller, CallerIdentity};
use crate::domain::{
    features, permissions, AuditAction, Invoice, InvoiceStatus, LineItem, Matter, TimeEntry,
};
use crate::error::{PlatformError, Result};
use crate::service::EventDraft;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub matter_id: String,
    pub time_entry_ids: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    pub amount_cents: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub id: String,
    pub matter_id: String,
    pub client_id: String,
    pub status: String,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub line_item_count: usize,
    pub created_at: String,
}

impl From<Invoice> for InvoiceResponse {
    fn from(i: Invoice) -> Self {
        Self {
            id: i.id,
            matter_id: i.matter_id,
            client_id: i.client_id,
            status: i.status.to_string(),
            total_cents: i.total_cents,
            paid_cents: i.paid_cents,
            line_item_count: i.line_items.len(),
            created_at: i.created_at.to_rfc3339(),
        }
    }
}

pub async fn invoice_create(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    req: CreateInvoiceRequest,
) -> Result<InvoiceResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(
            &caller.user_id,
            org_id,
            Some(features::INVOICING),
            Some(permissions::INVOICES_WRITE),
        )
        .await?;

    if req.time_entry_ids.is_empty() {
        return Err(PlatformError::validation(
            "at least one time entry is required",
        ));
    }
    if let Some(due) = req.due_date {
        if due < Utc::now() {
            return Err(PlatformError::InvalidDueDate);
        }
    }

    // Read, validate, and bill inside one transaction so no entry is ever
    // marked billed without its invoice.
    let mut txn = state.store.transaction().await?;

    let matter_doc = txn
        .get(&paths::matter(org_id, &req.matter_id))
        .await?
        .ok_or_else(|| PlatformError::not_found("Matter", &req.matter_id))?;
    let matter: Matter = serde_json::from_value(matter_doc)?;

    let mut entries = Vec::with_capacity(req.time_entry_ids.len());
    for entry_id in &req.time_entry_ids {
        let doc = txn
            .get(&paths::time_entry(org_id, entry_id))
            .await?
            .ok_or_else(|| PlatformError::not_found("TimeEntry", entry_id))?;
        let entry: TimeEntry = serde_json::from_value(doc)?;
        if entry.matter_id != matter.id {
            return Err(PlatformError::validation(format!(
                "time entry {} belongs to a different matter",
                entry_id
            )));
        }
        if entry.billed {
            return Err(PlatformError::conflict(format!(
                "time entry {} is already billed",
                entry_id
            )));
        }
        entries.push(entry);
    }

    let line_items: Vec<LineItem> = entries
        .iter()
        .map(|e| LineItem {
            time_entry_id: e.id.clone(),
            description: e.description.clone(),
            minutes: e.minutes,
            amount_cents: e.amount_cents,
        })
        .collect();

    let mut invoice = Invoice::new(org_id, &matter.id, &matter.client_id, line_items, &caller.user_id);
    invoice.due_date = req.due_date;

    for mut entry in entries {
        entry.mark_billed(&invoice.id);
        txn.set(&paths::time_entry(org_id, &entry.id), serde_json::to_value(&entry)?);
    }
    txn.create(&paths::invoice(org_id, &invoice.id), serde_json::to_value(&invoice)?);
    txn.commit().await?;

    state
        .audit
        .log_create(org_id, &caller.user_id, "Invoice", &invoice.id)
        .await;
    state
        .events
        .emit_best_effort(
            EventDraft::new(
                org_id,
                "invoice.created",
                "invoice",
                &invoice.id,
                Actor::user(&caller.user_id),
            )
            .with_matter(&invoice.matter_id)
            .with_payload(serde_json::json!({ "totalCents": invoice.total_cents })),
        )
        .await;

    Ok(invoice.into())
}

pub async fn invoice_get(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    id: &str,
) -> Result<InvoiceResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(
            &caller.user_id,
            org_id,
            Some(features::INVOICING),
            Some(permissions::INVOICES_READ),
        )
        .await?;

    let invoice = state
        .invoices
        .find_by_id(org_id, id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Invoice", id))?;
    Ok(invoice.into())
}

pub async fn invoice_send(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    id: &str,
) -> Result<InvoiceResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(
            &caller.user_id,
            org_id,
            Some(features::INVOICING),
            Some(permissions::INVOICES_WRITE),
        )
        .await?;

    let mut invoice = state
        .invoices
        .find_by_id(org_id, id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Invoice", id))?;

    if !invoice.status.can_transition(InvoiceStatus::Sent) {
        return Err(PlatformError::invalid_transition(invoice.status, InvoiceStatus::Sent));
    }
    invoice.status = InvoiceStatus::Sent;
    invoice.updated_at = Utc::now();
    state.invoices.update(&invoice).await?;

    state
        .audit
        .record(
            org_id,
            &caller.user_id,
            AuditAction::StatusChange,
            "Invoice",
            &invoice.id,
            Some(serde_json::json!({ "status": "SENT" })),
        )
        .await;
    state
        .events
        .emit_best_effort(EventDraft::new(
            org_id,
            "invoice.sent",
            "invoice",
            &invoice.id,
            Actor::user(&caller.user_id),
        ))
        .await;

    Ok(invoice.into())
}

pub async fn invoice_record_payment(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    id: &str,
    req: RecordPaymentRequest,
) -> Result<InvoiceResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(
            &caller.user_id,
            org_id,
            Some(features::INVOICING),
            Some(permissions::INVOICES_WRITE),
        )
        .await?;

    if req.amount_cents <= 0 {
        return Err(PlatformError::validation("amountCents must be positive"));
    }

    // Re-read inside the transaction: the paid total and status are computed
    // against the freshest committed state.
    let mut txn = state.store.transaction().await?;
    let doc = txn
        .get(&paths::invoice(org_id, id))
        .await?
        .ok_or_else(|| PlatformError::not_found("Invoice", id))?;
    let mut invoice: Invoice = serde_json::from_value(doc)?;

    if !invoice.status.accepts_payment() {
        return Err(PlatformError::invalid_transition(invoice.status, InvoiceStatus::Paid));
    }

    let was_paid = invoice.status == InvoiceStatus::Paid;
    invoice.apply_payment(req.amount_cents);
    txn.set(&paths::invoice(org_id, id), serde_json::to_value(&invoice)?);
    txn.commit().await?;

    state
        .audit
        .record(
            org_id,
            &caller.user_id,
            AuditAction::Payment,
            "Invoice",
            &invoice.id,
            Some(serde_json::json!({ "amountCents": req.amount_cents })),
        )
        .await;
    if !was_paid && invoice.status == InvoiceStatus::Paid {
        state
            .events
            .emit_best_effort(
                EventDraft::new(
                    org_id,
                    "invoice.paid",
                    "invoice",
                    &invoice.id,
                    Actor::user(&caller.user_id),
                )
                .with_payload(serde_json::json!({ "totalCents": invoice.total_cents })),
            )
            .await;
    }

    Ok(invoice.into())
}

pub async fn create_invoice(
    State(state): State<AppState>,
    caller: Caller,
    Path(org_id): Path<String>,
    Json(req): Json<CreateInvoiceRequest>,
) -> Json<ApiResponse<InvoiceResponse>> {
    Json(invoice_create(&state, &caller.0, &org_id, req).await.into())
}

pub async fn get_invoice(
    State(state): State<AppState>,
    caller: Caller,
    Path((org_id, id)): Path<(String, String)>,
) -> Json<ApiResponse<InvoiceResponse>> {
    Json(invoice_get(&state, &caller.0, &org_id, &id).await.into())
}

pub async fn send_invoice(
    State(state): State<AppState>,
    caller: Caller,
    Path((org_id, id)): Path<(String, String)>,
) -> Json<ApiResponse<InvoiceResponse>> {
    Json(invoice_send(&state, &caller.0, &org_id, &id).await.into())
}

pub async fn record_payment(
    State(state): State<AppState>,
    caller: Caller,
    Path((org_id, id)): Path<(String, String)>,
    Json(req): Json<RecordPaymentRequest>,
) -> Json<ApiResponse<InvoiceResponse>> {
    Json(
        invoice_record_payment(&state, &caller.0, &org_id, &id, req)
            .await
            .into(),
    )
}
