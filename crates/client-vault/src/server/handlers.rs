//! Axum request handlers for all service endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{
    protocol::{
        ClientCreate, ClientListItem, ClientResponse, ClientUpdate, CountResponse, ErrorResponse,
        HealthResponse, ListParams, ServiceInfo,
    },
    ServiceError,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    error::ApiError,
    extract::{ApiJson, ApiPath, ApiQuery},
    projection,
    state::AppState,
};
use crate::validation::{validate_create, validate_update};

/// `GET /`: service banner.
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "client-vault API".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        status: "running".into(),
    })
}

/// `GET /health`: readiness check.
///
/// Returns `200 OK` when the database answers, `503 Service Unavailable`
/// otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let database_ready = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "database ping failed");
            false
        }
    };

    let (status_code, status_str) = if database_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        database_ready,
    };
    (status_code, Json(body)).into_response()
}

/// `POST /api/v1/clients`: create a client; sensitive fields are encrypted
/// before they reach the database.
pub async fn create_client(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ClientCreate>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    let new_client = validate_create(req)?;
    let client = state.store.create(new_client).await?;
    info!(client_id = client.id, "client created");
    Ok((StatusCode::CREATED, Json(projection::full(client))))
}

/// `GET /api/v1/clients`: one page of clients, ordered by id.
pub async fn list_clients(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<ClientListItem>>, ApiError> {
    let limit = state.page_size(params.limit);
    let clients = state.store.list(params.skip, limit).await?;
    Ok(Json(clients.into_iter().map(projection::list_item).collect()))
}

/// `GET /api/v1/clients/{id}`
pub async fn get_client(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client = state.store.get(id).await?;
    Ok(Json(projection::full(client)))
}

/// `GET /api/v1/clients/uuid/{uuid}`
///
/// A value that is not a UUID cannot match any client and is reported as
/// not found.
pub async fn get_client_by_uuid(
    State(state): State<AppState>,
    ApiPath(raw): ApiPath<String>,
) -> Result<Json<ClientResponse>, ApiError> {
    let uuid = Uuid::parse_str(&raw)
        .map_err(|_| ApiError(ServiceError::NotFound(format!("client {raw}"))))?;
    let client = state.store.get_by_uuid(uuid).await?;
    Ok(Json(projection::full(client)))
}

/// `PUT /api/v1/clients/{id}`: partial update; only supplied fields change.
pub async fn update_client(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<ClientUpdate>,
) -> Result<Json<ClientResponse>, ApiError> {
    let patch = validate_update(req)?;
    let client = state.store.update(id, patch).await?;
    info!(client_id = id, "client updated");
    Ok(Json(projection::full(client)))
}

/// `DELETE /api/v1/clients/{id}`: hard delete.
pub async fn delete_client(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.store.delete(id).await?;
    info!(client_id = deleted.id, uuid = %deleted.uuid, "client deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/v1/clients/stats/count`
pub async fn count_clients(
    State(state): State<AppState>,
) -> Result<Json<CountResponse>, ApiError> {
    let total_clients = state.store.count().await?;
    Ok(Json(CountResponse { total_clients }))
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}
