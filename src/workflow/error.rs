use crate::model::leave_request::LeaveStatus;
use crate::store::StoreError;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Every way a submit/decide call can fail. The state machine never
/// suppresses one of these; the orchestrator and the HTTP layer return them
/// to the caller verbatim.
#[derive(Debug, Display)]
pub enum WorkflowError {
    #[display(fmt = "actor is not authorized to act on this leave request")]
    NotAuthorized,
    #[display(fmt = "illegal transition from status '{}'", _0)]
    InvalidStateTransition(LeaveStatus),
    #[display(fmt = "leave request already finalized as '{}'", _0)]
    AlreadyFinalized(LeaveStatus),
    #[display(fmt = "a signature is required")]
    MissingSignature,
    #[display(fmt = "non-empty comments are required")]
    MissingComments,
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "leave request not found")]
    NotFound,
    #[display(fmt = "concurrent update detected, re-fetch and retry")]
    Conflict,
    #[display(fmt = "backend unavailable: {}", _0)]
    Unavailable(String),
}

impl WorkflowError {
    /// Stable machine-readable code, independent of the display text.
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::NotAuthorized => "not_authorized",
            WorkflowError::InvalidStateTransition(_) => "invalid_state_transition",
            WorkflowError::AlreadyFinalized(_) => "already_finalized",
            WorkflowError::MissingSignature => "missing_signature",
            WorkflowError::MissingComments => "missing_comments",
            WorkflowError::Validation(_) => "validation_failed",
            WorkflowError::NotFound => "not_found",
            WorkflowError::Conflict => "conflict",
            WorkflowError::Unavailable(_) => "unavailable",
        }
    }
}

impl std::error::Error for WorkflowError {}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => WorkflowError::NotFound,
            StoreError::Conflict => WorkflowError::Conflict,
            StoreError::Backend(msg) => WorkflowError::Unavailable(msg),
        }
    }
}

impl ResponseError for WorkflowError {
    fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::NotAuthorized => StatusCode::FORBIDDEN,
            WorkflowError::InvalidStateTransition(_)
            | WorkflowError::AlreadyFinalized(_)
            | WorkflowError::Conflict => StatusCode::CONFLICT,
            WorkflowError::MissingSignature
            | WorkflowError::MissingComments
            | WorkflowError::Validation(_) => StatusCode::BAD_REQUEST,
            WorkflowError::NotFound => StatusCode::NOT_FOUND,
            WorkflowError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_mapping_follows_the_contract() {
        assert_eq!(
            WorkflowError::NotAuthorized.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            WorkflowError::AlreadyFinalized(LeaveStatus::Rejected).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            WorkflowError::InvalidStateTransition(LeaveStatus::Pending).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            WorkflowError::MissingComments.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(WorkflowError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            WorkflowError::Unavailable("timeout".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn store_errors_translate_into_workflow_errors() {
        assert!(matches!(
            WorkflowError::from(StoreError::NotFound),
            WorkflowError::NotFound
        ));
        assert!(matches!(
            WorkflowError::from(StoreError::Conflict),
            WorkflowError::Conflict
        ));
    }
}
