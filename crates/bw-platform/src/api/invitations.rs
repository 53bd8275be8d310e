//! Invitations API
//!
//! Only LAWYER, PARALEGAL, and VIEWER are invitable. Accept validates the
//! code, its status, and its expiry before creating the membership; the
//! membership write and the invitation state change commit together.

use axum::extract::{Path, State};
use axum::Json;
use bw_common::{Actor, ApiResponse};
use bw_store::paths;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::common::{require_org, AppState, Caller, CallerIdentity};
use crate::domain::{permissions, AuditAction, Invitation, InvitationStatus, Membership, Role};
use crate::error::{PlatformError, Result};
use crate::service::EventDraft;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationRequest {
    pub role: Role,
    pub email: Option<String>,
    /// Hours until the code expires; defaults to 72.
    pub ttl_hours: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationResponse {
    pub code: String,
    pub organization_id: String,
    pub role: Role,
    pub email: Option<String>,
    pub status: String,
    pub expires_at: String,
}

impl From<Invitation> for InvitationResponse {
    fn from(i: Invitation) -> Self {
        Self {
            code: i.code,
            organization_id: i.organization_id,
            role: i.role,
            email: i.email,
            status: match i.status {
                InvitationStatus::Pending => "PENDING".to_string(),
                InvitationStatus::Accepted => "ACCEPTED".to_string(),
                InvitationStatus::Revoked => "REVOKED".to_string(),
            },
            expires_at: i.expires_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationResponse {
    pub organization_id: String,
    pub role: Role,
}

pub async fn invitation_create(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    req: CreateInvitationRequest,
) -> Result<InvitationResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(
            &caller.user_id,
            org_id,
            None,
            Some(permissions::INVITATIONS_MANAGE),
        )
        .await?;

    if !req.role.invitable() {
        return Err(PlatformError::validation(format!(
            "role {} cannot be invited; only LAWYER, PARALEGAL or VIEWER",
            req.role.as_str()
        )));
    }
    let ttl_hours = req.ttl_hours.unwrap_or(Invitation::DEFAULT_TTL_HOURS);
    if !(1..=24 * 30).contains(&ttl_hours) {
        return Err(PlatformError::validation(
            "ttlHours must be between 1 and 720",
        ));
    }

    let mut invitation = Invitation::new(org_id, req.role, &caller.user_id, ttl_hours);
    if let Some(email) = req.email {
        if !email.contains('@') {
            return Err(PlatformError::validation("email must contain '@'"));
        }
        invitation = invitation.with_email(email);
    }

    state.invitations.insert(&invitation).await?;

    state
        .audit
        .record(
            org_id,
            &caller.user_id,
            AuditAction::Invite,
            "Invitation",
            &invitation.code,
            Some(serde_json::json!({ "role": invitation.role })),
        )
        .await;
    state
        .events
        .emit_best_effort(EventDraft::new(
            org_id,
            "member.invited",
            "invitation",
            &invitation.code,
            Actor::user(&caller.user_id),
        ))
        .await;

    Ok(invitation.into())
}

pub async fn invitation_accept(
    state: &AppState,
    caller: &CallerIdentity,
    code: &str,
) -> Result<AcceptInvitationResponse> {
    let mut invitation = state
        .invitations
        .find_by_code(code)
        .await?
        .ok_or_else(|| PlatformError::not_found("Invitation", code))?;

    if invitation.status != InvitationStatus::Pending {
        return Err(PlatformError::validation("invitation is no longer valid"));
    }
    let now = Utc::now();
    if invitation.is_expired(now) {
        // No membership is created for an expired code.
        return Err(PlatformError::validation("invitation code has expired"));
    }

    let org_id = invitation.organization_id.clone();
    if state
        .memberships
        .find(&org_id, &caller.user_id)
        .await?
        .is_some()
    {
        return Err(PlatformError::conflict(
            "caller is already a member of this organization",
        ));
    }

    invitation.accept(&caller.user_id, now);
    let membership = Membership::new(&org_id, &caller.user_id, invitation.role);

    // Membership and the consumed code commit together.
    let mut txn = state.store.transaction().await?;
    txn.create(
        &paths::member(&org_id, &caller.user_id),
        serde_json::to_value(&membership)?,
    );
    txn.set(
        &paths::invitation(&invitation.code),
        serde_json::to_value(&invitation)?,
    );
    txn.commit().await?;

    state
        .audit
        .record(
            &org_id,
            &caller.user_id,
            AuditAction::Accept,
            "Invitation",
            &invitation.code,
            None,
        )
        .await;
    state
        .events
        .emit_best_effort(
            EventDraft::new(
                &org_id,
                "member.joined",
                "membership",
                &caller.user_id,
                Actor::user(&caller.user_id),
            )
            .with_payload(serde_json::json!({ "role": invitation.role })),
        )
        .await;

    Ok(AcceptInvitationResponse {
        organization_id: org_id,
        role: invitation.role,
    })
}

pub async fn create_invitation(
    State(state): State<AppState>,
    caller: Caller,
    Path(org_id): Path<String>,
    Json(req): Json<CreateInvitationRequest>,
) -> Json<ApiResponse<InvitationResponse>> {
    Json(invitation_create(&state, &caller.0, &org_id, req).await.into())
}

pub async fn accept_invitation(
    State(state): State<AppState>,
    caller: Caller,
    Path(code): Path<String>,
) -> Json<ApiResponse<AcceptInvitationResponse>> {
    Json(invitation_accept(&state, &caller.0, &code).await.into())
}
