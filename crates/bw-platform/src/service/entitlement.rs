//! Entitlement Evaluator
//!
//! Pure allow/deny decision from membership, plan, and the static
//! role → permission matrix. Gate order is fixed — membership before plan,
//! plan before role — so the reported reason is always the first failing
//! gate. Nothing is cached: a membership or plan change takes effect on the
//! very next call.

use std::sync::Arc;

use crate::domain::Role;
use crate::error::{PlatformError, Result};
use crate::repository::{MembershipRepository, OrganizationRepository};

/// Why an evaluation denied access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Caller is not a member of the organization.
    OrgMember,
    /// The membership's role does not grant the required permission.
    RoleBlocked,
    /// The organization's plan does not include the required feature.
    PlanLimit,
}

/// Ephemeral decision; computed fresh per request, never persisted.
#[derive(Debug, Clone, Copy)]
pub struct Decision {
    pub allowed: bool,
    pub reason: Option<DenyReason>,
    /// The caller's role when membership resolved, for downstream use.
    pub role: Option<Role>,
}

impl Decision {
    fn allow(role: Role) -> Self {
        Self {
            allowed: true,
            reason: None,
            role: Some(role),
        }
    }

    fn deny(reason: DenyReason, role: Option<Role>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            role,
        }
    }
}

pub struct EntitlementService {
    orgs: Arc<OrganizationRepository>,
    memberships: Arc<MembershipRepository>,
}

impl EntitlementService {
    pub fn new(orgs: Arc<OrganizationRepository>, memberships: Arc<MembershipRepository>) -> Self {
        Self { orgs, memberships }
    }

    /// Evaluate the caller's entitlement.
    ///
    /// Checks, in order: membership exists, plan includes `required_feature`,
    /// role grants `required_permission`. Stops at the first failing gate.
    pub async fn evaluate(
        &self,
        caller_id: &str,
        organization_id: &str,
        required_feature: Option<&str>,
        required_permission: Option<&str>,
    ) -> Result<Decision> {
        let Some(membership) = self.memberships.find(organization_id, caller_id).await? else {
            return Ok(Decision::deny(DenyReason::OrgMember, None));
        };

        if let Some(feature) = required_feature {
            let org = self
                .orgs
                .find_by_id(organization_id)
                .await?
                .ok_or_else(|| PlatformError::not_found("Organization", organization_id))?;
            if !org.plan.has_feature(feature) {
                return Ok(Decision::deny(DenyReason::PlanLimit, Some(membership.role)));
            }
        }

        if let Some(permission) = required_permission {
            if !membership.role.has_permission(permission) {
                return Ok(Decision::deny(DenyReason::RoleBlocked, Some(membership.role)));
            }
        }

        Ok(Decision::allow(membership.role))
    }

    /// Evaluate and convert a denial into the matching platform error.
    /// Returns the caller's role on success.
    pub async fn require(
        &self,
        caller_id: &str,
        organization_id: &str,
        required_feature: Option<&str>,
        required_permission: Option<&str>,
    ) -> Result<Role> {
        let decision = self
            .evaluate(caller_id, organization_id, required_feature, required_permission)
            .await?;
        match (decision.allowed, decision.reason) {
            (true, _) => Ok(decision.role.unwrap_or(Role::Viewer)),
            (false, Some(DenyReason::OrgMember)) => Err(PlatformError::not_authorized(
                "caller is not a member of this organization",
            )),
            (false, Some(DenyReason::PlanLimit)) => Err(PlatformError::plan_limit(
                required_feature.unwrap_or_default(),
            )),
            (false, _) => Err(PlatformError::not_authorized(
                "role does not grant the required permission",
            )),
        }
    }
}
