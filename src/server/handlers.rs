//! HTTP handlers for /health, /bfhl and unmatched routes

use axum::{
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::AppState;
use crate::dispatch::dispatch;
use crate::envelope::Envelope;
use crate::error::{BfhlError, Result};
use crate::operation::Operation;

/// Health check; always succeeds
pub async fn health_handler(State(state): State<AppState>) -> Envelope {
    Envelope::identity(state.config.official_email.as_str())
}

/// Decode the raw body into a JSON object; an empty body is an empty object
fn decode_body(bytes: &[u8]) -> Result<Map<String, Value>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(BfhlError::NotAnObject),
        Err(e) => {
            debug!(error = %e, "Rejected malformed JSON body");
            Err(BfhlError::InvalidJson)
        }
    }
}

/// Decode an `application/x-www-form-urlencoded` body. Every value stays a
/// string; a key repeated (or written `key[]`) collects its values into an array.
fn decode_form(bytes: &[u8]) -> Result<Map<String, Value>> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(bytes).map_err(|e| {
        debug!(error = %e, "Rejected malformed form body");
        BfhlError::InvalidForm
    })?;

    let mut map = Map::new();
    for (key, value) in pairs {
        let (key, listed) = match key.strip_suffix("[]") {
            Some(stripped) => (stripped.to_string(), true),
            None => (key, false),
        };
        match map.get_mut(&key) {
            Some(Value::Array(items)) => items.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None if listed => {
                map.insert(key, Value::Array(vec![Value::String(value)]));
            }
            None => {
                map.insert(key, Value::String(value));
            }
        }
    }
    Ok(map)
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
}

/// POST /bfhl
pub async fn bfhl_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    match process(&state, &headers, body).await {
        Ok(response) => response,
        Err(err) => {
            if !err.is_server_error() {
                debug!(error = %err, "Rejected /bfhl request");
            }
            err.into_response()
        }
    }
}

async fn process(
    state: &AppState,
    headers: &HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Response> {
    let bytes = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            warn!("Request body exceeded the configured limit");
            BfhlError::PayloadTooLarge
        } else {
            BfhlError::Internal(anyhow::anyhow!("failed to read request body: {}", rejection.body_text()))
        }
    })?;

    let body = if is_form(headers) {
        decode_form(&bytes)?
    } else {
        decode_body(&bytes)?
    };
    let operation = Operation::from_body(&body)?;
    let output = dispatch(operation, state.model.as_deref()).await?;

    Ok(Envelope::success(state.config.official_email.as_str(), output).into_response())
}

/// Fallback for unknown paths and unsupported methods
pub async fn not_found_handler() -> BfhlError {
    BfhlError::NotFound
}
