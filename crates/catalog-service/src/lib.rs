pub mod api;
pub mod auth;
pub mod config;
pub mod envelope;
pub mod error;
pub mod folder;
pub mod image;
pub mod model;
pub mod product;
pub mod shutdown;
pub mod store;
pub mod topic;

pub use api::{AppState, router};
pub use auth::RequestContext;
pub use config::Config;
pub use error::CatalogError;
pub use folder::FolderService;
pub use image::{ImageResolver, RemoteImageResolver};
pub use product::ProductService;
pub use topic::{RemoteTopicLookup, TopicLookup};
