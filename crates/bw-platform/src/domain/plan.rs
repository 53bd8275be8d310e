//! Plan Tiers
//!
//! The plan tier on an organization gates features. The feature matrix is
//! static and code-defined; entitlement checks read it fresh on every call.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanTier {
    Starter,
    Professional,
    Enterprise,
}

impl Default for PlanTier {
    fn default() -> Self {
        Self::Starter
    }
}

/// Feature flags gated by plan tier.
pub mod features {
    pub const INVOICING: &str = "invoicing";
    pub const TASKS: &str = "tasks";
    pub const CLIENT_PORTAL: &str = "client_portal";
    pub const DOCUMENT_OCR: &str = "document_ocr";
    pub const EXPORTS: &str = "exports";
}

impl PlanTier {
    pub fn features(self) -> &'static [&'static str] {
        use features::*;
        match self {
            PlanTier::Starter => &[],
            PlanTier::Professional => &[INVOICING, TASKS, CLIENT_PORTAL],
            PlanTier::Enterprise => &[INVOICING, TASKS, CLIENT_PORTAL, DOCUMENT_OCR, EXPORTS],
        }
    }

    pub fn has_feature(self, feature: &str) -> bool {
        self.features().contains(&feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_strictly_nested() {
        for feature in PlanTier::Starter.features() {
            assert!(PlanTier::Professional.has_feature(feature));
        }
        for feature in PlanTier::Professional.features() {
            assert!(PlanTier::Enterprise.has_feature(feature));
        }
    }

    #[test]
    fn document_ocr_is_enterprise_only() {
        assert!(!PlanTier::Starter.has_feature(features::DOCUMENT_OCR));
        assert!(!PlanTier::Professional.has_feature(features::DOCUMENT_OCR));
        assert!(PlanTier::Enterprise.has_feature(features::DOCUMENT_OCR));
    }
}
