//! JSON envelopes: the one this service answers with, and the one its peers
//! answer with.

use std::fmt::Display;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            message: message.into(),
            data,
            error: None,
        }
    }

    pub fn error(status: StatusCode, err: &dyn Display) -> Self {
        Self {
            status_code: status.as_u16(),
            message: status.canonical_reason().unwrap_or("error").to_lowercase(),
            data: None,
            error: Some(err.to_string()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Result of decoding a well-formed peer envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeOutcome<T> {
    /// The peer reported a business-level 404.
    NotFound,
    /// No usable `data` payload.
    Empty,
    Found(T),
}

#[derive(Debug, Deserialize)]
struct PeerEnvelope {
    #[serde(default)]
    status_code: Option<Value>,
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    data: Option<Value>,
}

impl PeerEnvelope {
    fn status(&self) -> Option<u64> {
        let raw = self.status_code.as_ref().or(self.status.as_ref())?;
        match raw {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Decodes a peer body. Malformed JSON is an error; everything else is one of
/// the three [`EnvelopeOutcome`]s.
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<EnvelopeOutcome<T>, serde_json::Error> {
    let envelope: PeerEnvelope = serde_json::from_slice(body)?;

    if envelope.status() == Some(404) {
        return Ok(EnvelopeOutcome::NotFound);
    }

    let Some(data) = envelope.data.filter(|d| !d.is_null()) else {
        return Ok(EnvelopeOutcome::Empty);
    };

    match serde_json::from_value(data) {
        Ok(payload) => Ok(EnvelopeOutcome::Found(payload)),
        Err(e) => {
            tracing::debug!("peer data payload has unexpected shape: {}", e);
            Ok(EnvelopeOutcome::Empty)
        }
    }
}
