use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use service_registry::PeerError;
use thiserror::Error;

use crate::envelope::ApiResponse;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid id: {0:?}")]
    InvalidId(String),

    #[error("bearer credential missing from request context")]
    MissingCredential,

    #[error(transparent)]
    Peer(#[from] PeerError),

    #[error("malformed peer response: {0}")]
    MalformedEnvelope(#[from] serde_json::Error),

    #[error("image {0:?} has no resolvable url")]
    ImageUnresolved(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<JsonRejection> for CatalogError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidId(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MissingCredential => StatusCode::UNAUTHORIZED,
            Self::Peer(PeerError::Unavailable { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Peer(_) | Self::MalformedEnvelope(_) | Self::ImageUnresolved(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        (status, Json(ApiResponse::<()>::error(status, &self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(CatalogError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(CatalogError::InvalidId("zz".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(CatalogError::NotFound("product".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(CatalogError::MissingCredential.status(), StatusCode::UNAUTHORIZED);
        let unavailable = CatalogError::Peer(PeerError::Unavailable {
            service: "media-service".into(),
        });
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
