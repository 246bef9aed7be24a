//! Workshop management backend.
//!
//! Clients, parts inventory, and service orders for an auto repair shop.
//! Order totals are computed server-side by [`pricing`]; creating or
//! updating an order deducts the referenced parts from inventory inside
//! the same database transaction.

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod pricing;
pub mod services;

use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::auth::{AuthRouterExt, AuthService};
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{clients::ClientService, inventory::InventoryService, orders::OrderService};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: Arc<AppConfig>,
    pub event_sender: EventSender,
    pub clients: ClientService,
    pub inventory: InventoryService,
    pub orders: OrderService,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: Arc<AppConfig>, event_sender: EventSender) -> Self {
        Self {
            clients: ClientService::new(db.clone()),
            inventory: InventoryService::new(db.clone()),
            orders: OrderService::new(
                db.clone(),
                event_sender.clone(),
                config.trust_client_total,
            ),
            db,
            config,
            event_sender,
        }
    }
}

/// Versioned API surface. Health is open; everything else sits behind the
/// token check, with per-resource permission gates derived from the HTTP
/// method.
pub fn api_v1_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/health", handlers::health::health_routes())
        .nest(
            "/dashboard",
            handlers::dashboard::dashboard_routes().with_auth(),
        )
        .nest(
            "/clients",
            handlers::clients::client_routes().with_resource("clients"),
        )
        .nest(
            "/inventory",
            handlers::inventory::inventory_routes().with_resource("inventory"),
        )
        .nest(
            "/orders",
            handlers::orders::order_routes().with_resource("orders"),
        )
        .with_state(state)
}

/// Assembles the full application router: versioned API, login, Swagger UI,
/// and the instrumentation layers.
pub fn app_router(state: Arc<AppState>, auth_service: Arc<AuthService>) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes(state))
        .nest("/auth", auth::auth_routes().with_state(auth_service.clone()))
        .merge(openapi::swagger_ui())
        .layer(Extension(auth_service))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
}
