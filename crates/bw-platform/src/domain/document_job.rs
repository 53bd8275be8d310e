//! Document Extraction Job Entity
//!
//! A request for the external text-extraction pipeline to process an
//! uploaded blob. The platform only records the job and its status; the
//! pipeline itself is a collaborator.

use bw_common::TsidGenerator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentJobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

/// Content types the extraction pipeline accepts.
pub const EXTRACTABLE_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "image/png",
    "image/jpeg",
    "image/tiff",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentJob {
    pub id: String,
    pub organization_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matter_id: Option<String>,
    pub blob_key: String,
    pub content_type: String,
    pub status: DocumentJobStatus,
    pub requested_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentJob {
    pub fn new(
        organization_id: impl Into<String>,
        blob_key: impl Into<String>,
        content_type: impl Into<String>,
        requested_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TsidGenerator::generate(),
            organization_id: organization_id.into(),
            matter_id: None,
            blob_key: blob_key.into(),
            content_type: content_type.into(),
            status: DocumentJobStatus::Queued,
            requested_by: requested_by.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_matter(mut self, matter_id: impl Into<String>) -> Self {
        self.matter_id = Some(matter_id.into());
        self
    }
}
