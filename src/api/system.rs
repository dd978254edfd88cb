use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{ApiResponse, AppState, HealthResponse};

/// `GET /api/health`
///
/// 200 while the database answers, 503 otherwise. The transaction store's
/// last error is reported but does not fail the check.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let database = state.store().ping().await.is_ok();
    let transactions = state.transactions();

    let body = HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
        transactions_backend: transactions.backend_name(),
        transactions_error: transactions.last_error().await.map(|e| e.to_string()),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ApiResponse::success(body))).into_response()
}
