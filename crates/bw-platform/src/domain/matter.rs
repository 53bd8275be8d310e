//! Matter Entity
//!
//! A case/engagement for a client. Participants are the org members who may
//! be assigned work on the matter.

use bw_common::TsidGenerator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatterStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matter {
    pub id: String,
    pub organization_id: String,
    pub client_id: String,
    pub title: String,
    pub status: MatterStatus,
    pub participants: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Matter {
    pub fn new(
        organization_id: impl Into<String>,
        client_id: impl Into<String>,
        title: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let created_by = created_by.into();
        Self {
            id: TsidGenerator::generate(),
            organization_id: organization_id.into(),
            client_id: client_id.into(),
            title: title.into(),
            status: MatterStatus::Open,
            participants: vec![created_by.clone()],
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    pub fn add_participant(&mut self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        if !self.has_participant(&user_id) {
            self.participants.push(user_id);
            self.updated_at = Utc::now();
        }
    }
}
