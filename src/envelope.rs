// src/envelope.rs
// Uniform success/failure wrapper returned by every endpoint

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Response envelope. Exactly one of `data`/`error` is set on /bfhl responses;
/// the health check carries neither.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T = ()> {
    pub is_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(official_email: impl Into<String>, data: T) -> Self {
        Self {
            is_success: true,
            official_email: Some(official_email.into()),
            data: Some(data),
            error: None,
        }
    }
}

impl Envelope {
    /// Success without a payload
    pub fn identity(official_email: impl Into<String>) -> Self {
        Self {
            is_success: true,
            official_email: Some(official_email.into()),
            data: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            official_email: None,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
