//! Invitation Entity
//!
//! Invitations are keyed by their code in a flat top-level collection so
//! accept only needs the code. Only LAWYER, PARALEGAL, and VIEWER are
//! invitable; ADMIN and OWNER grants go through direct membership changes.

use bw_common::TsidGenerator;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Revoked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub code: String,
    pub organization_id: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub status: InvitationStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Invitation {
    pub const DEFAULT_TTL_HOURS: i64 = 72;

    pub fn new(
        organization_id: impl Into<String>,
        role: Role,
        created_by: impl Into<String>,
        ttl_hours: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            code: TsidGenerator::generate(),
            organization_id: organization_id.into(),
            role,
            email: None,
            status: InvitationStatus::Pending,
            created_by: created_by.into(),
            created_at: now,
            expires_at: now + Duration::hours(ttl_hours),
            accepted_by: None,
            accepted_at: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    pub fn accept(&mut self, user_id: impl Into<String>, now: DateTime<Utc>) {
        self.status = InvitationStatus::Accepted;
        self.accepted_by = Some(user_id.into());
        self.accepted_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_exclusive_of_the_deadline() {
        let invitation = Invitation::new("org1", Role::Viewer, "u1", 1);
        assert!(!invitation.is_expired(invitation.expires_at));
        assert!(invitation.is_expired(invitation.expires_at + Duration::seconds(1)));
    }
}
