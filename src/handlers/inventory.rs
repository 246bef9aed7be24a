use crate::{
    errors::ServiceError,
    handlers::SearchQuery,
    services::inventory::InventoryItemRequest,
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    params(SearchQuery),
    responses(
        (status = 200, description = "List of inventory items"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.inventory.list(query.search).await?;
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/low-stock",
    responses(
        (status = 200, description = "Items at or below their minimum quantity"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn list_low_stock(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.inventory.low_stock().await?;
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item id")),
    responses(
        (status = 200, description = "Item found"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.inventory.get(id).await?;
    Ok(Json(item))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory",
    request_body = InventoryItemRequest,
    responses(
        (status = 201, description = "Item created"),
        (status = 400, description = "Invalid payload")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InventoryItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.inventory.create(request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    put,
    path = "/api/v1/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item id")),
    request_body = InventoryItemRequest,
    responses(
        (status = 200, description = "Item updated"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<InventoryItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.inventory.update(id, request).await?;
    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/api/v1/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item id")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.inventory.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn inventory_routes() -> Router<Arc<AppState>> {
    // "/low-stock" registers before "/:id" so it is matched as a literal.
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/low-stock", get(list_low_stock))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
}
