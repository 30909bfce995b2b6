use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
    Starting,
    Stopping,
}

/// One registered instance of a logical service.
///
/// Instances are ephemeral: a value returned by discovery reflects the most
/// recent successful lookup and may already be stale when it is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub id: String,
    pub address: String,
    pub port: u16,
    pub status: ServiceStatus,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub version: String,
}

impl ServiceInfo {
    pub fn new(name: impl Into<String>, id: impl Into<String>, address: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            address: address.into(),
            port,
            status: ServiceStatus::Starting,
            metadata: HashMap::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_status(mut self, status: ServiceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }

    pub fn service_key(&self) -> String {
        format!("/services/{}/{}", self.name, self.id)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.address, self.port)
    }
}
