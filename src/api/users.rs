use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::{validate_page, validate_user_id};
use super::{ApiError, ApiResponse, AppState, UserListQuery, UserMessage};
use crate::models::{Page, UserDisplay};
use crate::services::{NewUser, UserUpdate};

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<ApiResponse<Page<UserDisplay>>>, ApiError> {
    let page = validate_page(query.page)?;

    let users = state
        .user_service()
        .list_users(query.search.as_deref(), page)
        .await?;

    Ok(Json(ApiResponse::success(users)))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDisplay>>, ApiError> {
    let id = validate_user_id(id)?;
    let user = state.user_service().get_user(id).await?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<UserMessage>>), ApiError> {
    let user = state.user_service().create_user(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserMessage {
            message: UserMessage::CREATED,
            user: Some(user),
        })),
    ))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<ApiResponse<UserMessage>>, ApiError> {
    let id = validate_user_id(id)?;
    let user = state.user_service().update_user(id, payload).await?;

    Ok(Json(ApiResponse::success(UserMessage {
        message: UserMessage::UPDATED,
        user: Some(user),
    })))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserMessage>>, ApiError> {
    let id = validate_user_id(id)?;
    state.user_service().delete_user(id).await?;

    Ok(Json(ApiResponse::success(UserMessage {
        message: UserMessage::DELETED,
        user: None,
    })))
}
