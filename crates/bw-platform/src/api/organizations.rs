//! Organizations API
//!
//! Organization creation writes the organization document and the founding
//! user's OWNER membership in one transaction.

use axum::extract::{Path, State};
use axum::Json;
use bw_common::{Actor, ApiResponse};
use bw_store::paths;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::common::{require_max_len, require_non_empty, require_org, AppState, Caller, CallerIdentity};
use crate::domain::{Membership, Organization, PlanTier, Role};
use crate::error::{PlatformError, Result};
use crate::service::EventDraft;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationRequest {
    pub name: String,
    /// Plan tier; defaults to STARTER.
    pub plan: Option<PlanTier>,
    pub timezone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationResponse {
    pub id: String,
    pub name: String,
    pub plan: PlanTier,
    pub timezone: String,
    pub created_at: String,
}

impl From<Organization> for OrganizationResponse {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id,
            name: org.name,
            plan: org.plan,
            timezone: org.settings.timezone,
            created_at: org.created_at.to_rfc3339(),
        }
    }
}

pub async fn organization_create(
    state: &AppState,
    caller: &CallerIdentity,
    req: CreateOrganizationRequest,
) -> Result<OrganizationResponse> {
    require_non_empty("name", &req.name)?;
    require_max_len("name", &req.name, 200)?;

    let mut org = Organization::new(req.name.trim(), &caller.user_id, req.plan.unwrap_or_default());
    if let Some(timezone) = req.timezone {
        org = org.with_timezone(timezone);
    }
    let membership = Membership::new(&org.id, &caller.user_id, Role::Owner);

    // The organization and its founding membership appear together.
    let mut txn = state.store.transaction().await?;
    txn.create(&paths::organization(&org.id), serde_json::to_value(&org)?);
    txn.create(
        &paths::member(&org.id, &caller.user_id),
        serde_json::to_value(&membership)?,
    );
    txn.commit().await?;

    state
        .audit
        .log_create(&org.id, &caller.user_id, "Organization", &org.id)
        .await;
    state
        .events
        .emit_best_effort(
            EventDraft::new(
                &org.id,
                "organization.created",
                "organization",
                &org.id,
                Actor::user(&caller.user_id),
            )
            .with_payload(serde_json::json!({ "name": org.name })),
        )
        .await;

    Ok(org.into())
}

pub async fn organization_get(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
) -> Result<OrganizationResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(&caller.user_id, org_id, None, None)
        .await?;

    let org = state
        .orgs
        .find_by_id(org_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Organization", org_id))?;
    Ok(org.into())
}

pub async fn create_organization(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateOrganizationRequest>,
) -> Json<ApiResponse<OrganizationResponse>> {
    Json(organization_create(&state, &caller.0, req).await.into())
}

pub async fn get_organization(
    State(state): State<AppState>,
    caller: Caller,
    Path(org_id): Path<String>,
) -> Json<ApiResponse<OrganizationResponse>> {
    Json(organization_get(&state, &caller.0, &org_id).await.into())
}
