use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use catalog_service::config::{RegistryBackend, StoreBackend};
use catalog_service::store::{
    FolderStore, MemoryFolderStore, MemoryProductStore, MongoFolderStore, MongoProductStore, ProductStore,
    connect_mongo,
};
use catalog_service::shutdown::shutdown_signal;
use catalog_service::{AppState, Config, FolderService, ProductService, RemoteImageResolver, RemoteTopicLookup};
use service_registry::{
    Discovery, EtcdRegistry, Gateway, HttpGateway, HttpRegistry, PeerBinding, Registrar, spawn_registration,
};

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt::init();

    let config = Config::from_env().context("invalid configuration")?;

    let (products, folders): (Arc<dyn ProductStore>, Arc<dyn FolderStore>) = match &config.store {
        StoreBackend::Mongo { uri, database } => {
            let db = connect_mongo(uri, database)
                .await
                .context("failed to connect to MongoDB")?;
            (
                Arc::new(MongoProductStore::new(&db)),
                Arc::new(MongoFolderStore::new(&db)),
            )
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            (Arc::new(MemoryProductStore::new()), Arc::new(MemoryFolderStore::new()))
        }
    };

    let (discovery, registrar): (Arc<dyn Discovery>, Arc<dyn Registrar>) = match &config.registry {
        RegistryBackend::Http { url } => {
            let registry = Arc::new(HttpRegistry::new(url.clone()));
            (registry.clone(), registry)
        }
        RegistryBackend::Etcd { endpoints, lease_ttl } => {
            let registry = Arc::new(
                EtcdRegistry::connect(endpoints.clone(), Some(*lease_ttl))
                    .await
                    .context("failed to connect to etcd")?,
            );
            (registry.clone(), registry)
        }
    };

    let gateway: Arc<dyn Gateway> =
        Arc::new(HttpGateway::new(config.peer_timeout).context("failed building HTTP client")?);

    let policy = config.binding_policy();
    let topic_peer = Arc::new(
        PeerBinding::bootstrap(discovery.as_ref(), gateway.clone(), &config.topic_service, &policy).await,
    );
    let image_peer = if config.image_service == config.topic_service {
        topic_peer.clone()
    } else {
        Arc::new(PeerBinding::bootstrap(discovery.as_ref(), gateway.clone(), &config.image_service, &policy).await)
    };

    let product_service = ProductService::new(
        products,
        folders.clone(),
        Arc::new(RemoteTopicLookup::new(topic_peer)),
        Arc::new(RemoteImageResolver::new(image_peer)),
    )
    .with_concurrency(config.enrichment_concurrency);

    let app = catalog_service::router(AppState {
        products: Arc::new(product_service),
        folders: Arc::new(FolderService::new(folders)),
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!("{} listening on {}", config.service_name, listener.local_addr()?);

    let registration = spawn_registration(
        registrar.clone(),
        config.service_name.clone(),
        config.advertise_address.clone(),
        config.port,
        config.discovery,
        KEEPALIVE_INTERVAL,
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Shutting down server...");
    if !registration.is_finished() {
        registration.abort();
        tracing::warn!("Stopped before registering with the registry");
    } else {
        match registration.await {
            Ok(Ok(registration)) => {
                if let Err(e) = registration.deregister(registrar.as_ref()).await {
                    tracing::warn!("Failed to deregister: {}", e);
                }
            }
            Ok(Err(e)) => tracing::error!("Served without registry registration: {}", e),
            Err(e) => tracing::error!("Registration task failed: {}", e),
        }
    }
    tracing::info!("Server stopped");

    Ok(())
}
