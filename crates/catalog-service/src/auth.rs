use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::CatalogError;

/// Per-request caller context handed to the services.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    credential: Option<String>,
}

impl RequestContext {
    pub fn with_credential(token: impl Into<String>) -> Self {
        Self {
            credential: Some(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` value.
pub fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Rejects requests without a bearer credential and stores the credential as
/// a [`RequestContext`] extension for the handlers.
pub async fn require_bearer(mut request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string);

    match token {
        Some(token) => {
            request.extensions_mut().insert(RequestContext::with_credential(token));
            next.run(request).await
        }
        None => CatalogError::MissingCredential.into_response(),
    }
}
