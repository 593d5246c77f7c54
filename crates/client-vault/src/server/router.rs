//! Route table and middleware stack.

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use super::{handlers, state::AppState};

/// Prefix under which the client API is mounted.
pub const API_PREFIX: &str = "/api/v1";

/// The full application: service routes at the root, the client API under
/// [`API_PREFIX`], and tracing, timeout, compression and CORS around both.
pub fn build(state: AppState, cors: CorsLayer, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest(API_PREFIX, client_routes())
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

fn client_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/clients",
            post(handlers::create_client).get(handlers::list_clients),
        )
        .route("/clients/stats/count", get(handlers::count_clients))
        .route("/clients/uuid/:uuid", get(handlers::get_client_by_uuid))
        .route(
            "/clients/:id",
            get(handlers::get_client)
                .put(handlers::update_client)
                .delete(handlers::delete_client),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use crate::store::testing::memory_store;

    async fn app() -> Router {
        build(
            AppState::new(memory_store().await, 10),
            CorsLayer::new(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn unmatched_path_hits_fallback() {
        let req = Request::builder()
            .uri("/unknown")
            .body(Body::empty())
            .unwrap();
        let resp = app().await.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn health_is_mounted_outside_api_prefix() {
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app().await.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn non_numeric_id_is_rejected_with_error_body() {
        let req = Request::builder()
            .uri("/api/v1/clients/abc")
            .body(Body::empty())
            .unwrap();
        let resp = app().await.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 400);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: common::protocol::ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.code, "bad_request");
    }

    #[tokio::test]
    async fn count_route_is_not_shadowed_by_id_route() {
        let req = Request::builder()
            .uri("/api/v1/clients/stats/count")
            .body(Body::empty())
            .unwrap();
        let resp = app().await.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
    }
}
