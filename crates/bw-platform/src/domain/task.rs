//! Task Entity
//!
//! Work items on a matter. The assignee must be an org member and a matter
//! participant; enforcement lives in the handler so the error codes can
//! distinguish the two failures.

use bw_common::TsidGenerator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Open,
    InProgress,
    Done,
}

impl TaskStatus {
    /// open → in_progress → done, strictly forward.
    pub fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::InProgress) | (Self::InProgress, Self::Done)
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub organization_id: String,
    pub matter_id: String,
    pub title: String,
    pub assignee_id: String,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        organization_id: impl Into<String>,
        matter_id: impl Into<String>,
        title: impl Into<String>,
        assignee_id: impl Into<String>,
        due_date: DateTime<Utc>,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TsidGenerator::generate(),
            organization_id: organization_id.into(),
            matter_id: matter_id.into(),
            title: title.into(),
            assignee_id: assignee_id.into(),
            due_date,
            status: TaskStatus::Open,
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_moves_strictly_forward() {
        assert!(TaskStatus::Open.can_transition(TaskStatus::InProgress));
        assert!(TaskStatus::InProgress.can_transition(TaskStatus::Done));
        assert!(!TaskStatus::Open.can_transition(TaskStatus::Done));
        assert!(!TaskStatus::Done.can_transition(TaskStatus::Open));
        assert!(!TaskStatus::InProgress.can_transition(TaskStatus::Open));
    }
}
