use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::discovery::{select_healthy, Discovery, Registrar};
use crate::error::{RegistryError, Result};
use crate::service::ServiceInfo;

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    service: &'a ServiceInfo,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    lease_id: i64,
}

#[derive(Debug, Serialize)]
struct KeepAliveRequest {
    lease_id: i64,
}

/// Client for the service-registry HTTP API.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRegistry {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_services(&self, service_name: &str) -> Result<Vec<ServiceInfo>> {
        debug!("Looking up service: {}", service_name);

        let response = self
            .client
            .get(format!("{}/api/registry/services/{}", self.base_url, service_name))
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(
                "Service registry returned error for {}: {}",
                service_name,
                response.status()
            );
            return Err(RegistryError::ConnectionError(format!(
                "registry returned {} for {}",
                response.status(),
                service_name
            )));
        }

        let body = response.bytes().await?;
        let services = serde_json::from_slice(&body)?;
        Ok(services)
    }
}

#[async_trait]
impl Discovery for HttpRegistry {
    async fn discover(&self, service_name: &str) -> Result<ServiceInfo> {
        let services = self.get_services(service_name).await?;
        let service = select_healthy(service_name, services)?;
        debug!("Found service {} at {}", service_name, service.base_url());
        Ok(service)
    }
}

#[async_trait]
impl Registrar for HttpRegistry {
    async fn register(&self, service: &ServiceInfo) -> Result<i64> {
        let response = self
            .client
            .post(format!("{}/api/registry/register", self.base_url))
            .json(&RegisterRequest { service })
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let registered: RegisterResponse = serde_json::from_slice(&body)?;
        Ok(registered.lease_id)
    }

    async fn keep_alive(&self, lease_id: i64) -> Result<()> {
        self.client
            .post(format!("{}/api/registry/keepalive", self.base_url))
            .json(&KeepAliveRequest { lease_id })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn deregister(&self, service: &ServiceInfo) -> Result<()> {
        self.client
            .post(format!("{}/api/registry/deregister", self.base_url))
            .json(service)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
