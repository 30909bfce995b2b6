use std::env;
use std::str::FromStr;
use std::time::Duration;

use service_registry::{BindingPolicy, RetryPolicy};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryBackend {
    Http { url: String },
    Etcd { endpoints: Vec<String>, lease_ttl: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo { uri: String, database: String },
    Memory,
}

/// Process configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub service_name: String,
    pub advertise_address: String,
    pub registry: RegistryBackend,
    pub topic_service: String,
    pub image_service: String,
    pub discovery: RetryPolicy,
    pub peer_timeout: Duration,
    pub local_test: bool,
    pub enrichment_concurrency: usize,
    pub store: StoreBackend,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let registry = match string("REGISTRY_BACKEND", "http").as_str() {
            "http" => RegistryBackend::Http {
                url: string("SERVICE_REGISTRY_URL", "http://service-registry:3003"),
            },
            "etcd" => RegistryBackend::Etcd {
                endpoints: string("ETCD_ENDPOINTS", "localhost:2379")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                lease_ttl: parse(&lookup, "REGISTRY_LEASE_TTL", 10)?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "REGISTRY_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        let store = match string("STORE_BACKEND", "mongo").as_str() {
            "mongo" => StoreBackend::Mongo {
                uri: string("MONGO_URI", "mongodb://localhost:27017"),
                database: string("MONGO_DB", "catalog"),
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        let advertise_address = lookup("ADVERTISE_ADDRESS").unwrap_or_else(|| {
            hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "localhost".to_string())
        });

        Ok(Self {
            port: parse(&lookup, "PORT", 8080)?,
            service_name: string("SERVICE_NAME", "product-service"),
            advertise_address,
            registry,
            topic_service: string("TOPIC_SERVICE_NAME", "media-service"),
            image_service: string("IMAGE_SERVICE_NAME", "media-service"),
            discovery: RetryPolicy::new(
                parse(&lookup, "DISCOVERY_MAX_ATTEMPTS", 10)?,
                Duration::from_secs(parse(&lookup, "DISCOVERY_BACKOFF_SECS", 3)?),
            ),
            peer_timeout: Duration::from_secs(parse(&lookup, "PEER_TIMEOUT_SECS", 10)?),
            local_test: lookup("LOCAL_TEST").is_some_and(|v| v == "true"),
            enrichment_concurrency: parse::<usize, _>(&lookup, "ENRICHMENT_CONCURRENCY", 8)?.max(1),
            store,
        })
    }

    pub fn binding_policy(&self) -> BindingPolicy {
        BindingPolicy {
            retry: self.discovery,
            address_override: self.local_test.then(|| "localhost".to_string()),
        }
    }
}

fn parse<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}
