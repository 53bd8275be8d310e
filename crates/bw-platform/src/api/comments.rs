//! Comments API
//!
//! Comments attach to a matter. The visibility tag decides whether the
//! client portal may surface the comment; the emitted event carries the same
//! tag so the notification processor can filter audiences.

use axum::extract::{Path, State};
use axum::Json;
use bw_common::{Actor, ApiResponse, Audience, Visibility};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::common::{require_max_len, require_non_empty, require_org, AppState, Caller, CallerIdentity};
use crate::domain::{permissions, Comment};
use crate::error::{PlatformError, Result};
use crate::service::EventDraft;

const MAX_COMMENT_LEN: usize = 10_000;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    pub body: String,
    /// `internal`, `client`, or `both`; defaults to the organization's
    /// default visibility.
    pub visibility: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub matter_id: String,
    pub author_id: String,
    pub body: String,
    pub visibility: String,
    pub created_at: String,
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            matter_id: c.matter_id,
            author_id: c.author_id,
            body: c.body,
            visibility: audience_str(c.visibility).to_string(),
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

fn audience_str(audience: Audience) -> &'static str {
    match audience {
        Audience::Internal => "internal",
        Audience::Client => "client",
        Audience::Both => "both",
    }
}

fn parse_audience(value: &str) -> Result<Audience> {
    match value {
        "internal" => Ok(Audience::Internal),
        "client" => Ok(Audience::Client),
        "both" => Ok(Audience::Both),
        other => Err(PlatformError::validation(format!(
            "unknown visibility '{}'",
            other
        ))),
    }
}

pub async fn comment_add(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    matter_id: &str,
    req: AddCommentRequest,
) -> Result<CommentResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(&caller.user_id, org_id, None, Some(permissions::COMMENTS_WRITE))
        .await?;

    require_non_empty("body", &req.body)?;
    require_max_len("body", &req.body, MAX_COMMENT_LEN)?;

    let matter = state
        .matters
        .find_by_id(org_id, matter_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Matter", matter_id))?;

    let visibility = match req.visibility.as_deref() {
        Some(value) => parse_audience(value)?,
        None => {
            let org = state
                .orgs
                .find_by_id(org_id)
                .await?
                .ok_or_else(|| PlatformError::not_found("Organization", org_id))?;
            org.settings.default_visibility
        }
    };

    let comment = Comment::new(org_id, &matter.id, &caller.user_id, req.body, visibility);
    state.comments.insert(&comment).await?;

    let preview: String = comment.body.chars().take(120).collect();
    state
        .events
        .emit_best_effort(
            EventDraft::new(
                org_id,
                "comment.added",
                "comment",
                &comment.id,
                Actor::user(&caller.user_id),
            )
            .with_matter(&matter.id)
            .with_visibility(Visibility {
                audience: visibility,
                roles_allowed: None,
            })
            .with_payload(serde_json::json!({
                "matterId": matter.id,
                "preview": preview,
            })),
        )
        .await;

    Ok(comment.into())
}

pub async fn comment_list(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    matter_id: &str,
) -> Result<Vec<CommentResponse>> {
    require_org(org_id)?;
    state
        .entitlements
        .require(&caller.user_id, org_id, None, Some(permissions::COMMENTS_READ))
        .await?;

    if state.matters.find_by_id(org_id, matter_id).await?.is_none() {
        return Err(PlatformError::not_found("Matter", matter_id));
    }

    let comments = state.comments.list_by_matter(org_id, matter_id).await?;
    Ok(comments.into_iter().map(Into::into).collect())
}

pub async fn add_comment(
    State(state): State<AppState>,
    caller: Caller,
    Path((org_id, matter_id)): Path<(String, String)>,
    Json(req): Json<AddCommentRequest>,
) -> Json<ApiResponse<CommentResponse>> {
    Json(comment_add(&state, &caller.0, &org_id, &matter_id, req).await.into())
}

pub async fn list_comments(
    State(state): State<AppState>,
    caller: Caller,
    Path((org_id, matter_id)): Path<(String, String)>,
) -> Json<ApiResponse<Vec<CommentResponse>>> {
    Json(comment_list(&state, &caller.0, &org_id, &matter_id).await.into())
}
