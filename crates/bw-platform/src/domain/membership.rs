//! Membership and Role Entities
//!
//! A membership is the (organization, user) → role record establishing
//! access. A user holds at most one role per organization; the membership
//! document is keyed by user id under the organization's members collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Owner,
    Admin,
    Lawyer,
    Paralegal,
    Viewer,
}

impl Role {
    /// Static role → permission matrix. Owner and Admin hold the superuser
    /// wildcard; the rest get explicit grants.
    pub fn permissions(self) -> &'static [&'static str] {
        use permissions::*;
        match self {
            Role::Owner | Role::Admin => &[ADMIN_ALL],
            Role::Lawyer => &[
                CLIENTS_READ,
                CLIENTS_WRITE,
                MATTERS_READ,
                MATTERS_WRITE,
                COMMENTS_READ,
                COMMENTS_WRITE,
                TIME_ENTRIES_WRITE,
                INVOICES_READ,
                INVOICES_WRITE,
                TASKS_READ,
                TASKS_WRITE,
                DOCUMENTS_READ,
                DOCUMENTS_WRITE,
            ],
            Role::Paralegal => &[
                CLIENTS_READ,
                MATTERS_READ,
                COMMENTS_READ,
                COMMENTS_WRITE,
                TIME_ENTRIES_WRITE,
                TASKS_READ,
                TASKS_WRITE,
                DOCUMENTS_READ,
                DOCUMENTS_WRITE,
            ],
            Role::Viewer => &[
                CLIENTS_READ,
                MATTERS_READ,
                COMMENTS_READ,
                INVOICES_READ,
                TASKS_READ,
                DOCUMENTS_READ,
            ],
        }
    }

    pub fn has_permission(self, permission: &str) -> bool {
        let granted = self.permissions();
        if granted.contains(&permission) || granted.contains(&permissions::ADMIN_ALL) {
            return true;
        }
        // resource:* wildcard
        if let Some(resource) = permission.split(':').next() {
            let wildcard = format!("{}:*", resource);
            if granted.iter().any(|p| *p == wildcard) {
                return true;
            }
        }
        false
    }

    /// Roles that may be granted through an invitation. Admin and Owner are
    /// never invitable.
    pub fn invitable(self) -> bool {
        matches!(self, Role::Lawyer | Role::Paralegal | Role::Viewer)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Admin => "ADMIN",
            Role::Lawyer => "LAWYER",
            Role::Paralegal => "PARALEGAL",
            Role::Viewer => "VIEWER",
        }
    }
}

/// Platform permission strings, `resource:action`.
pub mod permissions {
    pub const CLIENTS_READ: &str = "clients:read";
    pub const CLIENTS_WRITE: &str = "clients:write";

    pub const MATTERS_READ: &str = "matters:read";
    pub const MATTERS_WRITE: &str = "matters:write";

    pub const COMMENTS_READ: &str = "comments:read";
    pub const COMMENTS_WRITE: &str = "comments:write";

    pub const TIME_ENTRIES_WRITE: &str = "time-entries:write";

    pub const INVOICES_READ: &str = "invoices:read";
    pub const INVOICES_WRITE: &str = "invoices:write";

    pub const TASKS_READ: &str = "tasks:read";
    pub const TASKS_WRITE: &str = "tasks:write";

    pub const DOCUMENTS_READ: &str = "documents:read";
    pub const DOCUMENTS_WRITE: &str = "documents:write";

    pub const INVITATIONS_MANAGE: &str = "invitations:manage";

    pub const AUDIT_READ: &str = "audit:read";

    pub const ADMIN_ALL: &str = "*:*";
}

/// Membership record, keyed by user id under
/// `organizations/{orgId}/members/{userId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub organization_id: String,
    pub user_id: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(organization_id: impl Into<String>, user_id: impl Into<String>, role: Role) -> Self {
        Self {
            organization_id: organization_id.into(),
            user_id: user_id.into(),
            role,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_and_admin_hold_superuser_wildcard() {
        assert!(Role::Owner.has_permission("clients:write"));
        assert!(Role::Admin.has_permission("invitations:manage"));
        assert!(Role::Admin.has_permission("anything:everything"));
    }

    #[test]
    fn viewer_is_read_only() {
        assert!(Role::Viewer.has_permission("clients:read"));
        assert!(!Role::Viewer.has_permission("clients:write"));
        assert!(!Role::Viewer.has_permission("invitations:manage"));
    }

    #[test]
    fn paralegal_cannot_touch_invoices() {
        assert!(!Role::Paralegal.has_permission("invoices:write"));
        assert!(Role::Paralegal.has_permission("comments:write"));
    }

    #[test]
    fn only_junior_roles_are_invitable() {
        assert!(Role::Lawyer.invitable());
        assert!(Role::Paralegal.invitable());
        assert!(Role::Viewer.invitable());
        assert!(!Role::Admin.invitable());
        assert!(!Role::Owner.invitable());
    }

    #[test]
    fn role_serializes_screaming_snake() {
        assert_eq!(serde_json::to_string(&Role::Paralegal).unwrap(), "\"PARALEGAL\"");
    }
}
