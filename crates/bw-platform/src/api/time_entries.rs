//! Time Entries API

use axum::extract::{Path, State};
use axum::Json;
use bw_common::ApiResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::common::{require_non_empty, require_org, AppState, Caller, CallerIdentity};
use crate::domain::{permissions, TimeEntry};
use crate::error::{PlatformError, Result};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimeEntryRequest {
    pub description: String,
    pub minutes: u32,
    pub amount_cents: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryResponse {
    pub id: String,
    pub matter_id: String,
    pub description: String,
    pub minutes: u32,
    pub amount_cents: i64,
    pub billed: bool,
}

impl From<TimeEntry> for TimeEntryResponse {
    fn from(e: TimeEntry) -> Self {
        Self {
            id: e.id,
            matter_id: e.matter_id,
            description: e.description,
            minutes: e.minutes,
            amount_cents: e.amount_cents,
            billed: e.billed,
        }
    }
}

pub async fn time_entry_create(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    matter_id: &str,
    req: CreateTimeEntryRequest,
) -> Result<TimeEntryResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(
            &caller.user_id,
            org_id,
            None,
            Some(permissions::TIME_ENTRIES_WRITE),
        )
        .await?;

    require_non_empty("description", &req.description)?;
    if req.minutes == 0 {
        return Err(PlatformError::validation("minutes must be positive"));
    }
    if req.amount_cents < 0 {
        return Err(PlatformError::validation("amountCents must not be negative"));
    }

    if state.matters.find_by_id(org_id, matter_id).await?.is_none() {
        return Err(PlatformError::not_found("Matter", matter_id));
    }

    let entry = TimeEntry::new(
        org_id,
        matter_id,
        &caller.user_id,
        req.description.trim(),
        req.minutes,
        req.amount_cents,
    );
    state.time_entries.insert(&entry).await?;

    Ok(entry.into())
}

pub async fn time_entry_list_unbilled(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    matter_id: &str,
) -> Result<Vec<TimeEntryResponse>> {
    require_org(org_id)?;
    state
        .entitlements
        .require(&caller.user_id, org_id, None, Some(permissions::MATTERS_READ))
        .await?;

    let entries = state
        .time_entries
        .list_unbilled_by_matter(org_id, matter_id)
        .await?;
    Ok(entries.into_iter().map(Into::into).collect())
}

pub async fn create_time_entry(
    State(state): State<AppState>,
    caller: Caller,
    Path((org_id, matter_id)): Path<(String, String)>,
    Json(req): Json<CreateTimeEntryRequest>,
) -> Json<ApiResponse<TimeEntryResponse>> {
    Json(
        time_entry_create(&state, &caller.0, &org_id, &matter_id, req)
            .await
            .into(),
    )
}

pub async fn list_unbilled_time_entries(
    State(state): State<AppState>,
    caller: Caller,
    Path((org_id, matter_id)): Path<(String, String)>,
) -> Json<ApiResponse<Vec<TimeEntryResponse>>> {
    Json(
        time_entry_list_unbilled(&state, &caller.0, &org_id, &matter_id)
            .await
            .into(),
    )
}
