use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;
use tracing::debug;

use super::validation::{is_known_status, parse_query_date, validate_status};
use super::{ApiError, ApiResponse, AppState, StatusUpdateRequest, TransactionListQuery};
use crate::models::{StudentAutofill, Transaction};
use crate::store::TransactionFilter;

/// `GET /api/transactions`
///
/// Newest first. The date range applies only when both bounds are given.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<ApiResponse<Vec<Transaction>>>, ApiError> {
    let start = parse_query_date("start_date", query.start_date.as_deref())?;
    let end = parse_query_date("end_date", query.end_date.as_deref())?;

    if matches!((start, end), (Some(start), Some(end)) if start > end) {
        return Err(ApiError::validation("start_date must not be after end_date"));
    }

    let filter = TransactionFilter::new(query.search.unwrap_or_default()).with_range(start, end);
    let items = state.transactions().query(&filter).await;

    Ok(Json(ApiResponse::success(items)))
}

/// `PATCH /api/transactions/{reference}/status`
///
/// Responds with the record after the backend confirmed the change. A
/// refused change has already been rolled back when the error is returned.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(reference_code): Path<String>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<ApiResponse<Transaction>>, ApiError> {
    let status = validate_status(&payload.status)?;
    if !is_known_status(status) {
        debug!(reference_code = %reference_code, status, "Setting non-standard transaction status");
    }

    let store = state.transactions();
    if !store.update_status(&reference_code, status).await? {
        return Err(ApiError::transaction_not_found(&reference_code));
    }

    let updated = store
        .find(&reference_code)
        .await
        .ok_or_else(|| ApiError::transaction_not_found(&reference_code))?;

    Ok(Json(ApiResponse::success(updated)))
}

/// `GET /api/students/autofill`
pub async fn student_autofill(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<StudentAutofill>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.transactions().student_autofill().await,
    )))
}
