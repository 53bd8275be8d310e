//! Time Entry Entity

use bw_common::TsidGenerator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: String,
    pub organization_id: String,
    pub matter_id: String,
    pub user_id: String,
    pub description: String,
    pub minutes: u32,
    pub amount_cents: i64,
    pub billed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TimeEntry {
    pub fn new(
        organization_id: impl Into<String>,
        matter_id: impl Into<String>,
        user_id: impl Into<String>,
        description: impl Into<String>,
        minutes: u32,
        amount_cents: i64,
    ) -> Self {
        Self {
            id: TsidGenerator::generate(),
            organization_id: organization_id.into(),
            matter_id: matter_id.into(),
            user_id: user_id.into(),
            description: description.into(),
            minutes,
            amount_cents,
            billed: false,
            invoice_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn mark_billed(&mut self, invoice_id: impl Into<String>) {
        self.billed = true;
        self.invoice_id = Some(invoice_id.into());
    }
}
