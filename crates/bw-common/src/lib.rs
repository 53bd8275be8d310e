//! Shared wire types for the Briefwork platform.
//!
//! Every request handler returns the same success/error envelope, and every
//! error carries one of the codes in [`ErrorCode`]. The code set is part of
//! the client contract and must not be renamed or extended casually.

pub mod events;
pub mod outbox;
pub mod tsid;

use serde::{Deserialize, Serialize};

pub use events::{Actor, ActorType, Audience, DomainEvent, Visibility, MAX_PAYLOAD_BYTES};
pub use outbox::{
    outbox_id, InvalidTransition, OutboxRecord, OutboxStatus, DEFAULT_MAX_ATTEMPTS,
    JOB_TYPE_NOTIFICATION_DISPATCH,
};
pub use tsid::TsidGenerator;

/// Machine-readable error codes returned in the error envelope.
///
/// Preserved exactly for client compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    OrgRequired,
    NotAuthorized,
    PlanLimit,
    ValidationError,
    NotFound,
    InternalError,
    RateLimited,
    Conflict,
    SafetyError,
    InvalidStatusTransition,
    InvalidDueDate,
    AssigneeNotMember,
    AssigneeNotCaseParticipant,
}

/// Error body inside the failure envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Uniform response envelope.
///
/// `{ "success": true, "data": ... }` on success,
/// `{ "success": false, "error": { "code": ..., "message": ... } }` on failure.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Success { success: bool, data: T },
    Error { success: bool, error: ApiErrorBody },
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::Success {
            success: true,
            data,
        }
    }

    pub fn error(error: ApiErrorBody) -> Self {
        Self::Error {
            success: false,
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Error { error, .. } => Some(error.code),
            Self::Success { .. } => None,
        }
    }
}

impl<T, E> From<Result<T, E>> for ApiResponse<T>
where
    E: Into<ApiErrorBody>,
{
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::error(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_serialize_screaming_snake() {
        let code = serde_json::to_string(&ErrorCode::AssigneeNotCaseParticipant).unwrap();
        assert_eq!(code, "\"ASSIGNEE_NOT_CASE_PARTICIPANT\"");
        let code = serde_json::to_string(&ErrorCode::NotFound).unwrap();
        assert_eq!(code, "\"NOT_FOUND\"");
        let code = serde_json::to_string(&ErrorCode::InvalidStatusTransition).unwrap();
        assert_eq!(code, "\"INVALID_STATUS_TRANSITION\"");
    }

    #[test]
    fn success_envelope_shape() {
        let resp = ApiResponse::ok(serde_json::json!({"name": "Acme Corp"}));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["name"], "Acme Corp");
    }

    #[test]
    fn error_envelope_shape() {
        let resp: ApiResponse<()> =
            ApiResponse::error(ApiErrorBody::new(ErrorCode::NotFound, "Client not found"));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "NOT_FOUND");
        assert!(value["error"].get("details").is_none());
    }
}
