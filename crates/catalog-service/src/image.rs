use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use service_registry::{PeerBinding, PeerRequest};

use crate::envelope::{EnvelopeOutcome, decode_envelope};
use crate::error::CatalogError;

/// Turns a stored image key into a URL clients can load.
#[async_trait]
pub trait ImageResolver: Send + Sync {
    async fn resolve(&self, key: &str, credential: Option<&str>) -> Result<String, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: String,
}

pub struct RemoteImageResolver {
    peer: Arc<PeerBinding>,
}

impl RemoteImageResolver {
    pub fn new(peer: Arc<PeerBinding>) -> Self {
        Self { peer }
    }

    fn path(key: &str) -> String {
        let key: String = url::form_urlencoded::byte_serialize(key.as_bytes()).collect();
        format!("/api/v1/gateway/images/url?key={}", key)
    }
}

#[async_trait]
impl ImageResolver for RemoteImageResolver {
    async fn resolve(&self, key: &str, credential: Option<&str>) -> Result<String, CatalogError> {
        let mut request = PeerRequest::get(Self::path(key));
        if let Some(token) = credential.filter(|t| !t.trim().is_empty()) {
            request = request.bearer(token.trim());
        }

        let body = self.peer.call(request).await?;

        match decode_envelope::<ImageData>(&body)? {
            EnvelopeOutcome::Found(data) if !data.url.trim().is_empty() => Ok(data.url),
            _ => Err(CatalogError::ImageUnresolved(key.to_string())),
        }
    }
}
