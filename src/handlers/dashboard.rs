use crate::{errors::ServiceError, AppState};
use axum::{extract::State, routing::get, Json, Router};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub total_clients: u64,
    pub total_orders: u64,
    pub orders_by_status: BTreeMap<String, u64>,
    pub low_stock_items: u64,
}

/// Aggregate counters for the landing screen.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Workshop overview counters", body = DashboardResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "dashboard"
)]
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardResponse>, ServiceError> {
    let orders_by_status = state.orders.status_counts().await?;
    let total_orders = orders_by_status.values().sum();
    let total_clients = crate::entities::client::Entity::find()
        .count(state.db.as_ref())
        .await?;
    let low_stock_items = state.inventory.low_stock().await?.len() as u64;

    Ok(Json(DashboardResponse {
        total_clients,
        total_orders,
        orders_by_status,
        low_stock_items,
    }))
}

pub fn dashboard_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_dashboard))
}
