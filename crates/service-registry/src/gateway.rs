use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use tracing::debug;
use url::Url;

use crate::error::PeerError;
use crate::service::ServiceInfo;

/// A request addressed to whichever instance a binding resolved.
#[derive(Debug, Clone)]
pub struct PeerRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl PeerRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }
}

/// Performs the network call for a resolved instance.
///
/// Implementations return the raw body for every HTTP status; interpreting
/// the status is the caller's job. Only connection-level failures are errors.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn call(&self, instance: &ServiceInfo, request: PeerRequest) -> Result<Vec<u8>, PeerError>;
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

pub(crate) fn peer_url(instance: &ServiceInfo, path: &str) -> Result<Url, PeerError> {
    let base = instance.base_url();
    let url = Url::parse(&base).and_then(|b| b.join(path));
    url.map_err(|source| PeerError::InvalidUrl {
        url: format!("{}{}", base, path),
        source,
    })
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn call(&self, instance: &ServiceInfo, request: PeerRequest) -> Result<Vec<u8>, PeerError> {
        let url = peer_url(instance, &request.path)?;

        debug!("{} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method, url.clone())
            .header(CONTENT_TYPE, "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|source| PeerError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|source| PeerError::Transport {
            url: url.to_string(),
            source,
        })?;

        debug!("{} answered {} ({} bytes)", url, status, body.len());

        Ok(body.to_vec())
    }
}
