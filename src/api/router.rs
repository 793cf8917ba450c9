//! Re-parser API router.
//!
//! Two routes: `GET /health` and `POST /reparse`, both behind the
//! per-caller rate limiter.

use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the service router.
///
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`);
/// the rate-limit middleware reads the same context from an `Extension`
/// layer, which must sit outermost so it is populated first.
pub fn reparse_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/reparse", post(endpoints::reparse::reparse))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::Extension(ctx))
}
