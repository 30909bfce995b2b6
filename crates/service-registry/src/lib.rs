pub mod binding;
pub mod bootstrap;
pub mod discovery;
pub mod error;
pub mod gateway;
pub mod http;
pub mod registry;
pub mod retry;
pub mod service;

pub use binding::{BindingPolicy, PeerBinding};
pub use bootstrap::{register_with_retry, service_id, spawn_registration, Registration};
pub use discovery::{select_healthy, Discovery, Registrar};
pub use error::{PeerError, RegistryError};
pub use gateway::{Gateway, HttpGateway, PeerRequest};
pub use http::HttpRegistry;
pub use registry::EtcdRegistry;
pub use retry::RetryPolicy;
pub use service::{ServiceInfo, ServiceStatus};
