//! Platform Error Types

use bw_common::{ApiErrorBody, ErrorCode};
use bw_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("organization id is required")]
    OrgRequired,

    #[error("{message}")]
    NotAuthorized { message: String },

    #[error("plan does not include feature '{feature}'")]
    PlanLimit { feature: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    RateLimited { message: String },

    #[error("{message}")]
    Safety { message: String },

    #[error("invalid status transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("due date must not be in the past")]
    InvalidDueDate,

    #[error("assignee {user_id} is not a member of the organization")]
    AssigneeNotMember { user_id: String },

    #[error("assignee {user_id} is not a participant on this matter")]
    AssigneeNotCaseParticipant { user_id: String },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{message}")]
    Internal { message: String },
}

impl PlatformError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_authorized(message: impl Into<String>) -> Self {
        Self::NotAuthorized {
            message: message.into(),
        }
    }

    pub fn plan_limit(feature: impl Into<String>) -> Self {
        Self::PlanLimit {
            feature: feature.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn safety(message: impl Into<String>) -> Self {
        Self::Safety {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidStatusTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::OrgRequired => ErrorCode::OrgRequired,
            Self::NotAuthorized { .. } => ErrorCode::NotAuthorized,
            Self::PlanLimit { .. } => ErrorCode::PlanLimit,
            Self::Validation { .. } => ErrorCode::ValidationError,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Conflict { .. } => ErrorCode::Conflict,
            Self::RateLimited { .. } => ErrorCode::RateLimited,
            Self::Safety { .. } => ErrorCode::SafetyError,
            Self::InvalidStatusTransition { .. } => ErrorCode::InvalidStatusTransition,
            Self::InvalidDueDate => ErrorCode::InvalidDueDate,
            Self::AssigneeNotMember { .. } => ErrorCode::AssigneeNotMember,
            Self::AssigneeNotCaseParticipant { .. } => ErrorCode::AssigneeNotCaseParticipant,
            Self::Store(_) | Self::Json(_) | Self::Internal { .. } => ErrorCode::InternalError,
        }
    }
}

impl From<PlatformError> for ApiErrorBody {
    fn from(err: PlatformError) -> Self {
        let code = err.code();
        let message = match &err {
            // Infrastructure failures get a remediation hint, not internals.
            PlatformError::Store(inner) => {
                format!("storage operation failed ({}); check database indexes and connectivity", inner)
            }
            PlatformError::Json(_) => "internal serialization failure".to_string(),
            other => other.to_string(),
        };
        ApiErrorBody::new(code, message)
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;
