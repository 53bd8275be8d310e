//! Client Entity
//!
//! A client of the practice. Soft-deleted: a deleted client stays on disk
//! but reads as not-found through the API.

use bw_common::TsidGenerator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    Active,
    Deleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub status: ClientStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new(
        organization_id: impl Into<String>,
        name: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TsidGenerator::generate(),
            organization_id: organization_id.into(),
            name: name.into(),
            email: None,
            phone: None,
            notes: None,
            status: ClientStatus::Active,
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.status == ClientStatus::Deleted
    }

    pub fn soft_delete(&mut self) {
        self.status = ClientStatus::Deleted;
        self.updated_at = Utc::now();
    }
}
