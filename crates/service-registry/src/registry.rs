use crate::discovery::{select_healthy, Discovery, Registrar};
use crate::error::{RegistryError, Result};
use crate::service::ServiceInfo;
use async_trait::async_trait;
use etcd_client::{Client, GetOptions, PutOptions};
use tracing::{debug, info, warn};

/// Service discovery and registration using etcd as the backend.
///
/// Instances live under `/services/{name}/{id}` and are attached to a lease so
/// that a crashed process disappears once its TTL runs out.
#[derive(Clone)]
pub struct EtcdRegistry {
    client: Client,
    lease_ttl: i64,
}

impl EtcdRegistry {
    /// Connect to etcd.
    ///
    /// # Arguments
    /// * `endpoints` - List of etcd endpoints (e.g., ["localhost:2379"])
    /// * `lease_ttl` - Time-to-live for registrations in seconds (default: 10)
    pub async fn connect(endpoints: Vec<String>, lease_ttl: Option<i64>) -> Result<Self> {
        info!("Connecting to etcd at endpoints: {:?}", endpoints);

        let client = Client::connect(endpoints, None)
            .await
            .map_err(|e| RegistryError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            lease_ttl: lease_ttl.unwrap_or(10),
        })
    }

    /// All instances registered under `service_name`, healthy or not.
    pub async fn get_services(&self, service_name: &str) -> Result<Vec<ServiceInfo>> {
        let key = format!("/services/{}/", service_name);

        debug!("Getting all services with prefix: {}", key);

        let mut client = self.client.clone();
        let resp = client.get(key, Some(GetOptions::new().with_prefix())).await?;

        let mut services = Vec::new();
        for kv in resp.kvs() {
            match serde_json::from_slice(kv.value()) {
                Ok(service) => services.push(service),
                Err(e) => {
                    warn!("Failed to deserialize service: {}", e);
                    continue;
                }
            }
        }

        debug!("Found {} instances of service {}", services.len(), service_name);

        Ok(services)
    }
}

#[async_trait]
impl Discovery for EtcdRegistry {
    async fn discover(&self, service_name: &str) -> Result<ServiceInfo> {
        let services = self.get_services(service_name).await?;
        select_healthy(service_name, services)
    }
}

#[async_trait]
impl Registrar for EtcdRegistry {
    async fn register(&self, service: &ServiceInfo) -> Result<i64> {
        let key = service.service_key();
        let value = serde_json::to_string(service)?;

        debug!("Registering service at key: {}", key);

        let mut client = self.client.clone();
        let lease = client.lease_grant(self.lease_ttl, None).await?;
        let lease_id = lease.id();

        info!(
            "Created lease {} with TTL {} seconds for service {}",
            lease_id, self.lease_ttl, service.name
        );

        let put_options = PutOptions::new().with_lease(lease_id);
        client.put(key.clone(), value, Some(put_options)).await?;

        info!("Service {} registered at {}", service.name, key);

        Ok(lease_id)
    }

    async fn keep_alive(&self, lease_id: i64) -> Result<()> {
        debug!("Keeping lease {} alive", lease_id);

        let mut client = self.client.clone();
        let (mut keeper, mut stream) = client.lease_keep_alive(lease_id).await?;

        keeper.keep_alive().await?;

        if let Some(resp) = stream.message().await? {
            debug!("Lease {} kept alive, TTL: {}", resp.id(), resp.ttl());
        }

        Ok(())
    }

    async fn deregister(&self, service: &ServiceInfo) -> Result<()> {
        let key = service.service_key();

        info!("Deregistering service at key: {}", key);

        let mut client = self.client.clone();
        client.delete(key, None).await?;

        Ok(())
    }
}
