//! Tasks API
//!
//! The assignee must be an org member and a participant on the matter; the
//! two failures surface as distinct error codes so clients can prompt the
//! right fix.

use axum::extract::{Path, State};
use axum::Json;
use bw_common::{Actor, ApiResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::common::{require_max_len, require_non_empty, require_org, AppState, Caller, CallerIdentity};
use crate::domain::{features, permissions, AuditAction, Task, TaskStatus};
use crate::error::{PlatformError, Result};
use crate::service::EventDraft;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub matter_id: String,
    pub title: String,
    pub assignee_id: String,
    pub due_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: String,
    pub matter_id: String,
    pub title: String,
    pub assignee_id: String,
    pub due_date: String,
    pub status: String,
}

impl From<Task> for TaskResponse {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            matter_id: t.matter_id,
            title: t.title,
            assignee_id: t.assignee_id,
            due_date: t.due_date.to_rfc3339(),
            status: t.status.to_string(),
        }
    }
}

pub async fn task_create(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    req: CreateTaskRequest,
) -> Result<TaskResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(
            &caller.user_id,
            org_id,
            Some(features::TASKS),
            Some(permissions::TASKS_WRITE),
        )
        .await?;

    require_non_empty("title", &req.title)?;
    require_max_len("title", &req.title, 300)?;
    if req.due_date < Utc::now() {
        return Err(PlatformError::InvalidDueDate);
    }

    let matter = state
        .matters
        .find_by_id(org_id, &req.matter_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Matter", &req.matter_id))?;

    if state
        .memberships
        .find(org_id, &req.assignee_id)
        .await?
        .is_none()
    {
        return Err(PlatformError::AssigneeNotMember {
            user_id: req.assignee_id,
        });
    }
    if !matter.has_participant(&req.assignee_id) {
        return Err(PlatformError::AssigneeNotCaseParticipant {
            user_id: req.assignee_id,
        });
    }

    let task = Task::new(
        org_id,
        &matter.id,
        req.title.trim(),
        &req.assignee_id,
        req.due_date,
        &caller.user_id,
    );
    state.tasks.insert(&task).await?;

    state
        .audit
        .log_create(org_id, &caller.user_id, "Task", &task.id)
        .await;
    state
        .events
        .emit_best_effort(
            EventDraft::new(org_id, "task.assigned", "task", &task.id, Actor::user(&caller.user_id))
                .with_matter(&matter.id)
                .with_payload(serde_json::json!({ "assigneeId": task.assignee_id })),
        )
        .await;

    Ok(task.into())
}

pub async fn task_update_status(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    id: &str,
    req: UpdateTaskStatusRequest,
) -> Result<TaskResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(
            &caller.user_id,
            org_id,
            Some(features::TASKS),
            Some(permissions::TASKS_WRITE),
        )
        .await?;

    let mut task = state
        .tasks
        .find_by_id(org_id, id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Task", id))?;

    if !task.status.can_transition(req.status) {
        return Err(PlatformError::invalid_transition(task.status, req.status));
    }
    task.status = req.status;
    task.updated_at = Utc::now();
    state.tasks.update(&task).await?;

    state
        .audit
        .record(
            org_id,
            &caller.user_id,
            AuditAction::StatusChange,
            "Task",
            &task.id,
            Some(serde_json::json!({ "status": task.status })),
        )
        .await;
    if task.status == TaskStatus::Done {
        state
            .events
            .emit_best_effort(EventDraft::new(
                org_id,
                "task.completed",
                "task",
                &task.id,
                Actor::user(&caller.user_id),
            ))
            .await;
    }

    Ok(task.into())
}

pub async fn create_task(
    State(state): State<AppState>,
    caller: Caller,
    Path(org_id): Path<String>,
    Json(req): Json<CreateTaskRequest>,
) -> Json<ApiResponse<TaskResponse>> {
    Json(task_create(&state, &caller.0, &org_id, req).await.into())
}

pub async fn update_task_status(
    State(state): State<AppState>,
    caller: Caller,
    Path((org_id, id)): Path<(String, String)>,
    Json(req): Json<UpdateTaskStatusRequest>,
) -> Json<ApiResponse<TaskResponse>> {
    Json(task_update_status(&state, &caller.0, &org_id, &id, req).await.into())
}
