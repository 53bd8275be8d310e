//! Comment Entity

use bw_common::events::Audience;
use bw_common::TsidGenerator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub organization_id: String,
    pub matter_id: String,
    pub author_id: String,
    pub body: String,
    /// Who may see the comment: internal staff, the client portal, or both.
    pub visibility: Audience,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        organization_id: impl Into<String>,
        matter_id: impl Into<String>,
        author_id: impl Into<String>,
        body: impl Into<String>,
        visibility: Audience,
    ) -> Self {
        Self {
            id: TsidGenerator::generate(),
            organization_id: organization_id.into(),
            matter_id: matter_id.into(),
            author_id: author_id.into(),
            body: body.into(),
            visibility,
            created_at: Utc::now(),
        }
    }
}
