use crate::discovery::Registrar;
use crate::error::Result;
use crate::retry::RetryPolicy;
use crate::{ServiceInfo, ServiceStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// A live registration of this process. Dropping it leaves the lease to
/// expire on its own; [`Registration::deregister`] removes it eagerly.
#[derive(Debug)]
pub struct Registration {
    pub service: ServiceInfo,
    pub lease_id: i64,
    keepalive: JoinHandle<()>,
}

impl Registration {
    pub async fn deregister(self, registrar: &dyn Registrar) -> Result<()> {
        self.keepalive.abort();
        registrar.deregister(&self.service).await?;
        info!("Service {} ({}) deregistered", self.service.name, self.service.id);
        Ok(())
    }
}

/// Unique instance id derived from hostname and PID.
pub fn service_id() -> String {
    let hostname = hostname::get()
        .unwrap_or_else(|_| std::ffi::OsString::from("unknown"))
        .to_string_lossy()
        .to_string();
    format!("{}-{}", hostname, std::process::id())
}

/// Register `name` at `address:port` as healthy, retrying under `retry`, and
/// spawn a task refreshing the lease every `keepalive_every`.
pub async fn register_with_retry(
    registrar: Arc<dyn Registrar>,
    name: impl Into<String>,
    address: impl Into<String>,
    port: u16,
    retry: &RetryPolicy,
    keepalive_every: Duration,
) -> Result<Registration> {
    let service = ServiceInfo::new(name, service_id(), address, port).with_status(ServiceStatus::Healthy);

    let what = format!("registration of {}", service.name);
    let lease_id = {
        let registrar = registrar.as_ref();
        let service = &service;
        retry.run(&what, move || registrar.register(service)).await?
    };

    info!("Service {} registered with lease ID: {}", service.name, lease_id);

    let keepalive = tokio::spawn(async move {
        loop {
            tokio::time::sleep(keepalive_every).await;
            if let Err(e) = registrar.keep_alive(lease_id).await {
                error!("Failed to keep lease {} alive: {}", lease_id, e);
                break;
            }
        }
    });

    Ok(Registration {
        service,
        lease_id,
        keepalive,
    })
}

/// Runs [`register_with_retry`] on its own task so the caller can start
/// serving while the registry is still unreachable.
pub fn spawn_registration(
    registrar: Arc<dyn Registrar>,
    name: impl Into<String>,
    address: impl Into<String>,
    port: u16,
    retry: RetryPolicy,
    keepalive_every: Duration,
) -> JoinHandle<Result<Registration>> {
    let name = name.into();
    let address = address.into();
    tokio::spawn(async move { register_with_retry(registrar, name, address, port, &retry, keepalive_every).await })
}
