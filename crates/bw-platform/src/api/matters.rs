//! Matters API

use axum::extract::{Path, State};
use axum::Json;
use bw_common::{Actor, ApiResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::common::{require_max_len, require_non_empty, require_org, AppState, Caller, CallerIdentity};
use crate::domain::{permissions, Matter, MatterStatus};
use crate::error::{PlatformError, Result};
use crate::service::EventDraft;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatterRequest {
    pub client_id: String,
    pub title: String,
    /// Additional participants beyond the creator.
    #[serde(default)]
    pub participants: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatterResponse {
    pub id: String,
    pub client_id: String,
    pub title: String,
    pub status: String,
    pub participants: Vec<String>,
    pub created_at: String,
}

impl From<Matter> for MatterResponse {
    fn from(m: Matter) -> Self {
        Self {
            id: m.id,
            client_id: m.client_id,
            title: m.title,
            status: match m.status {
                MatterStatus::Open => "OPEN".to_string(),
                MatterStatus::Closed => "CLOSED".to_string(),
            },
            participants: m.participants,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

pub async fn matter_create(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    req: CreateMatterRequest,
) -> Result<MatterResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(&caller.user_id, org_id, None, Some(permissions::MATTERS_WRITE))
        .await?;

    require_non_empty("title", &req.title)?;
    require_max_len("title", &req.title, 300)?;

    // Cross-org or missing client both read as not-found.
    match state.clients.find_by_id(org_id, &req.client_id).await? {
        Some(client) if !client.is_deleted() => {}
        _ => return Err(PlatformError::not_found("Client", &req.client_id)),
    }

    let mut matter = Matter::new(org_id, &req.client_id, req.title.trim(), &caller.user_id);
    for participant in req.participants {
        // Only existing org members can participate.
        if state.memberships.find(org_id, &participant).await?.is_none() {
            return Err(PlatformError::validation(format!(
                "participant {} is not an organization member",
                participant
            )));
        }
        matter.add_participant(participant);
    }

    state.matters.insert(&matter).await?;

    state
        .audit
        .log_create(org_id, &caller.user_id, "Matter", &matter.id)
        .await;
    state
        .events
        .emit_best_effort(
            EventDraft::new(
                org_id,
                "matter.created",
                "matter",
                &matter.id,
                Actor::user(&caller.user_id),
            )
            .with_matter(&matter.id)
            .with_payload(serde_json::json!({ "title": matter.title })),
        )
        .await;

    Ok(matter.into())
}

pub async fn matter_get(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    id: &str,
) -> Result<MatterResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(&caller.user_id, org_id, None, Some(permissions::MATTERS_READ))
        .await?;

    let matter = state
        .matters
        .find_by_id(org_id, id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Matter", id))?;
    Ok(matter.into())
}

pub async fn matter_list(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
) -> Result<Vec<MatterResponse>> {
    require_org(org_id)?;
    state
        .entitlements
        .require(&caller.user_id, org_id, None, Some(permissions::MATTERS_READ))
        .await?;

    let matters = state.matters.list(org_id).await?;
    Ok(matters.into_iter().map(Into::into).collect())
}

pub async fn create_matter(
    State(state): State<AppState>,
    caller: Caller,
    Path(org_id): Path<String>,
    Json(req): Json<CreateMatterRequest>,
) -> Json<ApiResponse<MatterResponse>> {
    Json(matter_create(&state, &caller.0, &org_id, req).await.into())
}

pub async fn get_matter(
    State(state): State<AppState>,
    caller: Caller,
    Path((org_id, id)): Path<(String, String)>,
) -> Json<ApiResponse<MatterResponse>> {
    Json(matter_get(&state, &caller.0, &org_id, &id).await.into())
}

pub async fn list_matters(
    State(state): State<AppState>,
    caller: Caller,
    Path(org_id): Path<String>,
) -> Json<ApiResponse<Vec<MatterResponse>>> {
    Json(matter_list(&state, &caller.0, &org_id).await.into())
}
