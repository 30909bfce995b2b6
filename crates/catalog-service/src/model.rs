use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Prefix of every product QR token; the product id follows it.
pub const QR_PREFIX: &str = "SENBOX.ORG[PRODUCT]:";

pub fn qr_token(id: &ObjectId) -> String {
    format!("{}{}", QR_PREFIX, id.to_hex())
}

pub fn parse_id(raw: &str) -> Result<ObjectId, CatalogError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| CatalogError::InvalidId(raw.to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub product_name: String,
    pub original_price_store: f64,
    pub original_price_service: f64,
    #[serde(default)]
    pub product_description: String,
    pub cover_image: String,
    pub topic_id: ObjectId,
    pub folder_id: ObjectId,
    pub qrcode: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<ObjectId>,
}

/// `{id, name}` reference to an entity owned elsewhere. The default value is
/// what a failed or absent lookup renders as.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl From<&Folder> for EntityRef {
    fn from(folder: &Folder) -> Self {
        Self::new(folder.id.to_hex(), folder.name.clone())
    }
}

/// The composite product returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    pub id: String,
    pub product_name: String,
    pub original_price_store: f64,
    pub original_price_service: f64,
    pub product_description: String,
    pub cover_image: String,
    pub topic: EntityRef,
    pub folder: EntityRef,
    pub qrcode: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductView {
    pub fn assemble(product: Product, topic: EntityRef, folder: EntityRef, cover_image: String) -> Self {
        Self {
            id: product.id.to_hex(),
            product_name: product.product_name,
            original_price_store: product.original_price_store,
            original_price_service: product.original_price_service,
            product_description: product.product_description,
            cover_image,
            topic,
            folder,
            qrcode: product.qrcode,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateProductRequest {
    pub product_name: String,
    pub original_price_store: f64,
    pub original_price_service: f64,
    pub product_description: String,
    pub cover_image: String,
    pub topic_id: String,
    pub folder_id: String,
}

/// Partial update: empty strings and zero prices leave the stored value alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateProductRequest {
    pub product_name: String,
    pub original_price_store: f64,
    pub original_price_service: f64,
    pub product_description: String,
    pub cover_image: String,
    pub topic_id: String,
    pub folder_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFolderRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderView {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
}

impl From<Folder> for FolderView {
    fn from(folder: Folder) -> Self {
        Self {
            id: folder.id.to_hex(),
            name: folder.name,
            parent_id: folder.parent_id.map(|p| p.to_hex()),
        }
    }
}
