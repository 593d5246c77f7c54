//! Axum middleware layers applied to the router.
//!
//! Request tracing, timeout enforcement, and response compression are wired
//! in [`super::router::build`]; CORS is built here from configuration.

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// CORS layer allowing exactly the configured origins, any method and header.
///
/// # Errors
///
/// Returns an error if an origin is not a valid header value.
pub fn cors(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin: {o}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}
