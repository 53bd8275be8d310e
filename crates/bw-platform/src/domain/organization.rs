//! Organization Entity
//!
//! The tenant boundary. Every other entity is scoped under exactly one
//! organization; organizations are never hard-deleted.

use bw_common::events::Audience;
use bw_common::TsidGenerator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PlanTier;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgSettings {
    pub timezone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_hours: Option<BusinessHours>,
    /// Default audience for comment visibility when the author does not
    /// specify one.
    pub default_visibility: Audience,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHours {
    pub start: String,
    pub end: String,
}

impl Default for OrgSettings {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            business_hours: None,
            default_visibility: Audience::Internal,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub plan: PlanTier,
    pub settings: OrgSettings,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(name: impl Into<String>, created_by: impl Into<String>, plan: PlanTier) -> Self {
        let now = Utc::now();
        Self {
            id: TsidGenerator::generate(),
            name: name.into(),
            plan,
            settings: OrgSettings::default(),
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.settings.timezone = timezone.into();
        self
    }
}
