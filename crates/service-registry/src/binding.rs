use std::sync::Arc;

use tracing::{error, info};

use crate::discovery::Discovery;
use crate::error::PeerError;
use crate::gateway::{Gateway, PeerRequest};
use crate::retry::RetryPolicy;
use crate::service::ServiceInfo;

/// How a binding resolves its peer at startup.
#[derive(Debug, Clone, Default)]
pub struct BindingPolicy {
    pub retry: RetryPolicy,
    /// Replaces the discovered address (local development against a
    /// registry that advertises container hostnames).
    pub address_override: Option<String>,
}

/// A process-lifetime handle to one instance of a dependent service.
///
/// Discovery happens once, in [`PeerBinding::bootstrap`]. If it never
/// succeeds the binding holds no instance and every call fails fast with
/// [`PeerError::Unavailable`]; nothing re-discovers on the request path.
pub struct PeerBinding {
    service_name: String,
    instance: Option<ServiceInfo>,
    gateway: Arc<dyn Gateway>,
}

impl PeerBinding {
    pub async fn bootstrap(
        discovery: &dyn Discovery,
        gateway: Arc<dyn Gateway>,
        service_name: impl Into<String>,
        policy: &BindingPolicy,
    ) -> Self {
        let service_name = service_name.into();
        let what = format!("discovery of {}", service_name);

        let name = service_name.as_str();
        let instance = match policy.retry.run(&what, move || discovery.discover(name)).await {
            Ok(instance) => {
                let instance = match &policy.address_override {
                    Some(address) => {
                        info!("Overriding {} address with {}", service_name, address);
                        instance.with_address(address.clone())
                    }
                    None => instance,
                };
                info!("Bound {} to {}", service_name, instance.base_url());
                Some(instance)
            }
            Err(e) => {
                error!(
                    "Service {} not found after {} attempts, continuing without it: {}",
                    service_name, policy.retry.max_attempts, e
                );
                None
            }
        };

        Self {
            service_name,
            instance,
            gateway,
        }
    }

    pub fn resolved(instance: ServiceInfo, gateway: Arc<dyn Gateway>) -> Self {
        Self {
            service_name: instance.name.clone(),
            instance: Some(instance),
            gateway,
        }
    }

    pub fn unresolved(service_name: impl Into<String>, gateway: Arc<dyn Gateway>) -> Self {
        Self {
            service_name: service_name.into(),
            instance: None,
            gateway,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn instance(&self) -> Option<&ServiceInfo> {
        self.instance.as_ref()
    }

    pub fn is_available(&self) -> bool {
        self.instance.is_some()
    }

    pub async fn call(&self, request: PeerRequest) -> Result<Vec<u8>, PeerError> {
        let instance = self.instance.as_ref().ok_or_else(|| PeerError::Unavailable {
            service: self.service_name.clone(),
        })?;
        self.gateway.call(instance, request).await
    }
}

impl std::fmt::Debug for PeerBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerBinding")
            .field("service_name", &self.service_name)
            .field("instance", &self.instance)
            .finish_non_exhaustive()
    }
}
