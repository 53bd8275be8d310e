//! Audit Trail API
//!
//! Read-only access to the organization's compliance trail. Restricted to
//! roles holding the audit permission (OWNER/ADMIN via the wildcard).

use axum::extract::{Path, State};
use axum::Json;
use bw_common::ApiResponse;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::common::{require_org, AppState, Caller, CallerIdentity};
use crate::domain::{permissions, AuditEvent};
use crate::error::Result;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditEventResponse {
    pub id: String,
    pub actor_id: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub created_at: String,
}

impl From<AuditEvent> for AuditEventResponse {
    fn from(e: AuditEvent) -> Self {
        Self {
            id: e.id,
            actor_id: e.actor_id,
            action: e.action.as_str().to_string(),
            entity_type: e.entity_type,
            entity_id: e.entity_id,
            created_at: e.created_at.to_rfc3339(),
        }
    }
}

pub async fn audit_trail_list(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
) -> Result<Vec<AuditEventResponse>> {
    require_org(org_id)?;
    state
        .entitlements
        .require(&caller.user_id, org_id, None, Some(permissions::AUDIT_READ))
        .await?;

    let mut events = state.audit_events.list_by_org(org_id).await?;
    events.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(events.into_iter().map(Into::into).collect())
}

pub async fn list_audit_trail(
    State(state): State<AppState>,
    caller: Caller,
    Path(org_id): Path<String>,
) -> Json<ApiResponse<Vec<AuditEventResponse>>> {
    Json(audit_trail_list(&state, &caller.0, &org_id).await.into())
}
