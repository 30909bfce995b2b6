//! Product aggregation.
//!
//! Reads join a stored product with three independent enrichments: its
//! folder from the local store, its topic from the topic peer, and its cover
//! image URL from the image peer. A failed enrichment is logged and replaced
//! by a zero value; only failing to load the product itself fails a read.

use std::sync::Arc;

use chrono::Utc;
use futures_util::StreamExt;
use futures_util::stream;
use mongodb::bson::oid::ObjectId;
use tracing::{debug, info, warn};

use crate::auth::RequestContext;
use crate::error::CatalogError;
use crate::image::ImageResolver;
use crate::model::{
    CreateProductRequest, EntityRef, Product, ProductView, UpdateProductRequest, parse_id, qr_token,
};
use crate::store::{FolderStore, ProductStore};
use crate::topic::TopicLookup;

pub const DEFAULT_ENRICHMENT_CONCURRENCY: usize = 8;

pub struct ProductService {
    products: Arc<dyn ProductStore>,
    folders: Arc<dyn FolderStore>,
    topics: Arc<dyn TopicLookup>,
    images: Arc<dyn ImageResolver>,
    concurrency: usize,
}

fn require_text(value: &str, message: &str) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::validation(message));
    }
    Ok(())
}

fn check_price(value: f64, field: &str) -> Result<(), CatalogError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CatalogError::validation(format!("{} must be a positive number", field)));
    }
    Ok(())
}

fn require_price(value: f64, field: &str) -> Result<(), CatalogError> {
    if value == 0.0 {
        return Err(CatalogError::validation(format!("{} is required", field)));
    }
    check_price(value, field)
}

impl ProductService {
    pub fn new(
        products: Arc<dyn ProductStore>,
        folders: Arc<dyn FolderStore>,
        topics: Arc<dyn TopicLookup>,
        images: Arc<dyn ImageResolver>,
    ) -> Self {
        Self {
            products,
            folders,
            topics,
            images,
            concurrency: DEFAULT_ENRICHMENT_CONCURRENCY,
        }
    }

    /// Bounds how many products of a listing are enriched at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn create(&self, req: CreateProductRequest) -> Result<String, CatalogError> {
        require_text(&req.product_name, "product name is required")?;
        require_price(req.original_price_store, "original price store")?;
        require_price(req.original_price_service, "original price service")?;
        require_text(&req.folder_id, "folder id is required")?;
        require_text(&req.topic_id, "topic id is required")?;
        require_text(&req.cover_image, "cover image is required")?;

        let folder_id = parse_id(&req.folder_id)?;
        let topic_id = parse_id(&req.topic_id)?;

        let id = ObjectId::new();
        let now = Utc::now();
        let product = Product {
            id,
            product_name: req.product_name,
            original_price_store: req.original_price_store,
            original_price_service: req.original_price_service,
            product_description: req.product_description,
            cover_image: req.cover_image,
            topic_id,
            folder_id,
            qrcode: qr_token(&id),
            created_at: now,
            updated_at: now,
        };

        let id = self.products.insert(&product).await?;
        info!("Created product {}", id);
        Ok(id.to_hex())
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<ProductView>, CatalogError> {
        let products = self.products.find_all().await?;
        debug!("Enriching {} products", products.len());

        let views: Vec<ProductView> = stream::iter(products)
            .map(|product| self.enrich(ctx, product))
            .buffered(self.concurrency)
            .collect()
            .await;
        Ok(views)
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<ProductView, CatalogError> {
        let product = self.load(id).await?;
        Ok(self.enrich(ctx, product).await)
    }

    /// Fetch, merge non-empty fields, write back. Concurrent updates of the
    /// same product race and the last write wins.
    pub async fn update(&self, id: &str, req: UpdateProductRequest) -> Result<(), CatalogError> {
        let mut product = self.load(id).await?;

        if !req.product_name.trim().is_empty() {
            product.product_name = req.product_name;
        }
        if req.original_price_store != 0.0 {
            check_price(req.original_price_store, "original price store")?;
            product.original_price_store = req.original_price_store;
        }
        if req.original_price_service != 0.0 {
            check_price(req.original_price_service, "original price service")?;
            product.original_price_service = req.original_price_service;
        }
        if !req.product_description.trim().is_empty() {
            product.product_description = req.product_description;
        }
        if !req.cover_image.trim().is_empty() {
            product.cover_image = req.cover_image;
        }
        if !req.topic_id.trim().is_empty() {
            product.topic_id = parse_id(&req.topic_id)?;
        }
        if !req.folder_id.trim().is_empty() {
            product.folder_id = parse_id(&req.folder_id)?;
        }
        product.updated_at = Utc::now();

        self.products.update(&product).await?;
        info!("Updated product {}", product.id);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        let object_id = parse_id(id)?;
        if !self.products.delete(object_id).await? {
            return Err(CatalogError::NotFound(format!("product {}", id)));
        }
        info!("Deleted product {}", id);
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Product, CatalogError> {
        let object_id = parse_id(id)?;
        self.products
            .find_by_id(object_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("product {}", id)))
    }

    async fn enrich(&self, ctx: &RequestContext, product: Product) -> ProductView {
        let (folder, topic, cover_image) = tokio::join!(
            self.folder_summary(&product),
            self.topic_ref(ctx, &product),
            self.cover_image(ctx, &product),
        );
        ProductView::assemble(product, topic, folder, cover_image)
    }

    async fn folder_summary(&self, product: &Product) -> EntityRef {
        match self.folders.find_by_id(product.folder_id).await {
            Ok(Some(folder)) => EntityRef::from(&folder),
            Ok(None) => {
                warn!("Folder {} of product {} not found", product.folder_id, product.id);
                EntityRef::default()
            }
            Err(e) => {
                warn!("Error getting folder for product {}: {}", product.id, e);
                EntityRef::default()
            }
        }
    }

    async fn topic_ref(&self, ctx: &RequestContext, product: &Product) -> EntityRef {
        match self.topics.fetch(&product.topic_id.to_hex(), ctx.credential()).await {
            Ok(Some(topic)) => topic,
            Ok(None) => {
                debug!("Topic {} of product {} is absent", product.topic_id, product.id);
                EntityRef::default()
            }
            Err(e) => {
                warn!("Error getting topic for product {}: {}", product.id, e);
                EntityRef::default()
            }
        }
    }

    async fn cover_image(&self, ctx: &RequestContext, product: &Product) -> String {
        if product.cover_image.is_empty() {
            return String::new();
        }
        match self.images.resolve(&product.cover_image, ctx.credential()).await {
            Ok(url) => url,
            Err(e) => {
                warn!("Error getting image url for product {}: {}", product.id, e);
                product.cover_image.clone()
            }
        }
    }
}
