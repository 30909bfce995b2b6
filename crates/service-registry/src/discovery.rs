use async_trait::async_trait;

use crate::error::{RegistryError, Result};
use crate::service::ServiceInfo;

/// Resolves a logical service name to one live instance.
#[async_trait]
pub trait Discovery: Send + Sync {
    /// Returns the first healthy instance registered under `service_name`.
    async fn discover(&self, service_name: &str) -> Result<ServiceInfo>;
}

/// Lease-backed self registration.
#[async_trait]
pub trait Registrar: Send + Sync {
    async fn register(&self, service: &ServiceInfo) -> Result<i64>;

    async fn keep_alive(&self, lease_id: i64) -> Result<()>;

    async fn deregister(&self, service: &ServiceInfo) -> Result<()>;
}

/// First healthy entry wins. No load balancing.
pub fn select_healthy(service_name: &str, instances: Vec<ServiceInfo>) -> Result<ServiceInfo> {
    if instances.is_empty() {
        return Err(RegistryError::ServiceNotFound(service_name.to_string()));
    }

    instances
        .into_iter()
        .find(ServiceInfo::is_healthy)
        .ok_or_else(|| RegistryError::NoHealthyInstance(service_name.to_string()))
}
