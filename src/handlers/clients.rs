use crate::{
    errors::ServiceError,
    handlers::SearchQuery,
    services::clients::ClientRequest,
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
    path = "/api/v1/clients",
    params(SearchQuery),
    responses(
        (status = 200, description = "List of clients"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let clients = state.clients.list(query.search).await?;
    Ok(Json(clients))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client found"),
        (status = 404, description = "Client not found")
    ),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
pub async fn get_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let client = state.clients.get(id).await?;
    Ok(Json(client))
}

#[utoipa::path(
    post,
    path = "/api/v1/clients",
    request_body = ClientRequest,
    responses(
        (status = 201, description = "Client created"),
        (status = 400, description = "Invalid payload")
    ),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ClientRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let client = state.clients.create(request).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

#[utoipa::path(
    put,
    path = "/api/v1/clients/{id}",
    params(("id" = Uuid, Path, description = "Client id")),
    request_body = ClientRequest,
    responses(
        (status = 200, description = "Client updated"),
        (status = 404, description = "Client not found")
    ),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ClientRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let client = state.clients.update(id, request).await?;
    Ok(Json(client))
}

#[utoipa::path(
    delete,
    path = "/api/v1/clients/{id}",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 404, description = "Client not found")
    ),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.clients.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn client_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route(
            "/:id",
            get(get_client).put(update_client).delete(delete_client),
        )
}
