//! Documents API
//!
//! Records extraction jobs for the external text-extraction pipeline and
//! mints signed download URLs. The pipeline and blob storage are
//! collaborators behind their ports.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::Json;
use bw_common::{Actor, ApiResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::common::{require_non_empty, require_org, AppState, Caller, CallerIdentity};
use crate::domain::{
    features, permissions, DocumentJob, DocumentJobStatus, EXTRACTABLE_CONTENT_TYPES,
};
use crate::error::{PlatformError, Result};
use crate::service::EventDraft;

const SIGNED_URL_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestExtractionRequest {
    pub blob_key: String,
    pub content_type: String,
    pub matter_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentJobResponse {
    pub id: String,
    pub blob_key: String,
    pub status: String,
    pub matter_id: Option<String>,
    pub created_at: String,
}

impl From<DocumentJob> for DocumentJobResponse {
    fn from(j: DocumentJob) -> Self {
        Self {
            id: j.id,
            blob_key: j.blob_key,
            status: match j.status {
                DocumentJobStatus::Queued => "QUEUED".to_string(),
                DocumentJobStatus::Processing => "PROCESSING".to_string(),
                DocumentJobStatus::Completed => "COMPLETED".to_string(),
                DocumentJobStatus::Failed => "FAILED".to_string(),
            },
            matter_id: j.matter_id,
            created_at: j.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponse {
    pub url: String,
    pub expires_in_seconds: u64,
}

pub async fn document_extraction_request(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    req: RequestExtractionRequest,
) -> Result<DocumentJobResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(
            &caller.user_id,
            org_id,
            Some(features::DOCUMENT_OCR),
            Some(permissions::DOCUMENTS_WRITE),
        )
        .await?;

    require_non_empty("blobKey", &req.blob_key)?;
    if !EXTRACTABLE_CONTENT_TYPES.contains(&req.content_type.as_str()) {
        return Err(PlatformError::safety(format!(
            "content type '{}' is not accepted for extraction",
            req.content_type
        )));
    }
    if !state.blobs.exists(&req.blob_key).await? {
        return Err(PlatformError::validation(format!(
            "no uploaded blob at '{}'",
            req.blob_key
        )));
    }

    let mut job = DocumentJob::new(org_id, &req.blob_key, &req.content_type, &caller.user_id);
    if let Some(matter_id) = req.matter_id {
        if state.matters.find_by_id(org_id, &matter_id).await?.is_none() {
            return Err(PlatformError::not_found("Matter", &matter_id));
        }
        job = job.with_matter(matter_id);
    }

    state.document_jobs.insert(&job).await?;

    state
        .audit
        .log_create(org_id, &caller.user_id, "DocumentJob", &job.id)
        .await;
    let mut draft = EventDraft::new(
        org_id,
        "document.extraction_requested",
        "document_job",
        &job.id,
        Actor::user(&caller.user_id),
    )
    .with_payload(serde_json::json!({ "blobKey": job.blob_key }));
    if let Some(matter_id) = &job.matter_id {
        draft = draft.with_matter(matter_id);
    }
    state.events.emit_best_effort(draft).await;

    Ok(job.into())
}

pub async fn document_signed_url(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    job_id: &str,
) -> Result<SignedUrlResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(
            &caller.user_id,
            org_id,
            None,
            Some(permissions::DOCUMENTS_READ),
        )
        .await?;

    let job = state
        .document_jobs
        .find_by_id(org_id, job_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("DocumentJob", job_id))?;

    let url = state.blobs.signed_url(&job.blob_key, SIGNED_URL_TTL).await?;
    Ok(SignedUrlResponse {
        url,
        expires_in_seconds: SIGNED_URL_TTL.as_secs(),
    })
}

pub async fn request_extraction(
    State(state): State<AppState>,
    caller: Caller,
    Path(org_id): Path<String>,
    Json(req): Json<RequestExtractionRequest>,
) -> Json<ApiResponse<DocumentJobResponse>> {
    Json(
        document_extraction_request(&state, &caller.0, &org_id, req)
            .await
            .into(),
    )
}

pub async fn get_signed_url(
    State(state): State<AppState>,
    caller: Caller,
    Path((org_id, job_id)): Path<(String, String)>,
) -> Json<ApiResponse<SignedUrlResponse>> {
    Json(document_signed_url(&state, &caller.0, &org_id, &job_id).await.into())
}
