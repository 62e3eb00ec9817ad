// src/error.rs
// Error taxonomy for the /bfhl service and its mapping onto the response envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::envelope::Envelope;
use crate::kernels::KernelError;

/// Every failure the service can report to a caller
#[derive(Error, Debug)]
pub enum BfhlError {
    #[error("Request must contain exactly one key")]
    MultipleOrMissingKeys,

    #[error("Invalid key. Must be one of: fibonacci, prime, lcm, hcf, AI")]
    UnknownOperation(String),

    #[error("{0}")]
    InvalidValue(String),

    #[error("Request body must be valid JSON")]
    InvalidJson,

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Request body must be valid form data")]
    InvalidForm,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Too many requests from this IP, please try again later.")]
    RateLimited,

    #[error("Endpoint not found")]
    NotFound,

    #[error("AI service not configured")]
    ServiceNotConfigured,

    /// The cause is logged, never returned to the caller
    #[error("AI service temporarily unavailable")]
    ServiceUnavailable(#[source] anyhow::Error),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

/// Convenience type alias for Result using BfhlError
pub type Result<T> = std::result::Result<T, BfhlError>;

impl BfhlError {
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MultipleOrMissingKeys
            | Self::UnknownOperation(_)
            | Self::InvalidValue(_)
            | Self::InvalidJson
            | Self::NotAnObject
            | Self::InvalidForm => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ServiceNotConfigured | Self::ServiceUnavailable(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl From<KernelError> for BfhlError {
    fn from(err: KernelError) -> Self {
        BfhlError::Internal(err.into())
    }
}

impl From<tokio::task::JoinError> for BfhlError {
    fn from(err: tokio::task::JoinError) -> Self {
        BfhlError::Internal(err.into())
    }
}

impl IntoResponse for BfhlError {
    fn into_response(self) -> Response {
        match &self {
            BfhlError::ServiceUnavailable(cause) | BfhlError::Internal(cause) => {
                error!(error = ?cause, "{}", self);
            }
            BfhlError::ServiceNotConfigured => {
                error!("AI request received but no GEMINI_API_KEY is configured");
            }
            _ => {}
        }

        (self.status_code(), Envelope::failure(self.to_string())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_400() {
        for err in [
            BfhlError::MultipleOrMissingKeys,
            BfhlError::UnknownOperation("invalid".to_string()),
            BfhlError::invalid_value("bad"),
            BfhlError::InvalidJson,
            BfhlError::NotAnObject,
            BfhlError::InvalidForm,
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert!(!err.is_server_error());
        }
    }

    #[test]
    fn test_collaborator_statuses() {
        assert_eq!(BfhlError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(BfhlError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(BfhlError::PayloadTooLarge.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_server_errors_hide_cause() {
        let err = BfhlError::ServiceUnavailable(anyhow::anyhow!("Gemini API error: 403 - key leaked"));
        assert!(err.is_server_error());
        assert_eq!(err.to_string(), "AI service temporarily unavailable");

        let err = BfhlError::Internal(anyhow::anyhow!("stack trace here"));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn test_kernel_error_is_internal() {
        let err: BfhlError = KernelError::Overflow("lcm").into();
        assert!(matches!(err, BfhlError::Internal(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unknown_operation_message() {
        let err = BfhlError::UnknownOperation("invalid".to_string());
        assert!(err.to_string().starts_with("Invalid key"));
    }
}
