//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub api_key_configured: bool,
    pub version: &'static str,
}

/// `GET /health` — liveness check for the scoring client. Reports whether
/// the model path has a credential so degraded deployments are visible.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        api_key_configured: ctx.api_key_configured,
        version: crate::config::APP_VERSION,
    })
}
