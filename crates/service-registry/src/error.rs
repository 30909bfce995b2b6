use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("etcd error: {0}")]
    EtcdError(#[from] etcd_client::Error),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("registry http error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("service not found: {0}")]
    ServiceNotFound(String),

    #[error("no healthy instance of service: {0}")]
    NoHealthyInstance(String),

    #[error("invalid service data: {0}")]
    InvalidServiceData(String),

    #[error("connection error: {0}")]
    ConnectionError(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Failures on the discovery-and-call path to a peer service.
#[derive(Error, Debug)]
pub enum PeerError {
    #[error("discovery failed: {0}")]
    Discovery(#[from] RegistryError),

    /// The binding never resolved an instance during bootstrap.
    #[error("peer service {service} is unavailable")]
    Unavailable { service: String },

    #[error("transport error calling {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid peer url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
