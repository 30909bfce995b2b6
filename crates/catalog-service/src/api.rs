use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use tower_http::trace::TraceLayer;

use crate::auth::{RequestContext, require_bearer};
use crate::envelope::ApiResponse;
use crate::error::CatalogError;
use crate::folder::FolderService;
use crate::model::{
    CreateFolderRequest, CreateProductRequest, FolderView, ProductView, UpdateFolderRequest,
    UpdateProductRequest,
};
use crate::product::ProductService;

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<ProductService>,
    pub folders: Arc<FolderService>,
}

type ApiResult<T> = Result<ApiResponse<T>, CatalogError>;

pub fn router(state: AppState) -> Router {
    let products = Router::new()
        .route("/api/v1/products", get(list_products).post(create_product))
        .route(
            "/api/v1/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route_layer(middleware::from_fn(require_bearer));

    let folders = Router::new()
        .route("/api/v1/folders", get(list_folders).post(create_folder))
        .route(
            "/api/v1/folders/{id}",
            get(get_folder).put(update_folder).delete(delete_folder),
        );

    Router::new()
        .route("/health", get(health))
        .merge(products)
        .merge(folders)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn health() -> &'static str {
    "OK"
}

async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> ApiResult<String> {
    let Json(req) = payload?;
    let id = state.products.create(req).await?;
    Ok(ApiResponse::success("Product created successfully", Some(id)))
}

async fn list_products(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> ApiResult<Vec<ProductView>> {
    let products = state.products.list(&ctx).await?;
    Ok(ApiResponse::success("Products retrieved successfully", Some(products)))
}

async fn get_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<ProductView> {
    let product = state.products.get(&ctx, &id).await?;
    Ok(ApiResponse::success("Product retrieved successfully", Some(product)))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Json(req) = payload?;
    state.products.update(&id, req).await?;
    Ok(ApiResponse::success("Product updated successfully", None))
}

async fn delete_product(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.products.delete(&id).await?;
    Ok(ApiResponse::success("Product deleted successfully", None))
}

async fn create_folder(
    State(state): State<AppState>,
    payload: Result<Json<CreateFolderRequest>, JsonRejection>,
) -> ApiResult<String> {
    let Json(req) = payload?;
    let id = state.folders.create(req).await?;
    Ok(ApiResponse::success("Folder created successfully", Some(id)))
}

async fn list_folders(State(state): State<AppState>) -> ApiResult<Vec<FolderView>> {
    let folders = state.folders.list().await?;
    Ok(ApiResponse::success("Folders retrieved successfully", Some(folders)))
}

async fn get_folder(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<FolderView> {
    let folder = state.folders.get(&id).await?;
    Ok(ApiResponse::success("Folder retrieved successfully", Some(folder)))
}

async fn update_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateFolderRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Json(req) = payload?;
    state.folders.update(&id, req).await?;
    Ok(ApiResponse::success("Folder updated successfully", None))
}

async fn delete_folder(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.folders.delete(&id).await?;
    Ok(ApiResponse::success("Folder deleted successfully", None))
}
