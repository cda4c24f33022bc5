use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::api::auth::CurrentUser;
use crate::api::types::{CreateCommentRequest, CreateFeedRequest, MessageResponse};
use crate::services::{CommentInfo, FeedDetail, FeedInfo};

/// POST /workspaces/{slug}/feeds
pub async fn create_feed(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(slug): Path<String>,
    Json(payload): Json<CreateFeedRequest>,
) -> Result<Json<ApiResponse<FeedInfo>>, ApiError> {
    let feed = state
        .feed_service()
        .create_feed(&slug, &user.id, &payload.title, &payload.content)
        .await?;

    Ok(Json(ApiResponse::success(feed)))
}

/// GET /workspaces/{slug}/feeds
pub async fn list_feeds(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<Vec<FeedInfo>>>, ApiError> {
    let feeds = state.feed_service().list_feeds(&slug).await?;

    Ok(Json(ApiResponse::success(feeds)))
}

/// GET /feeds/{id}
/// Feed detail including its comments
pub async fn get_feed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FeedDetail>>, ApiError> {
    let detail = state.feed_service().get_feed(&id).await?;

    Ok(Json(ApiResponse::success(detail)))
}

/// DELETE /feeds/{id}
/// Removes the feed and all of its comments
pub async fn delete_feed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.feed_service().delete_feed(&id).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Feed deleted".to_string(),
    })))
}

/// POST /feeds/{id}/comments
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<Json<ApiResponse<CommentInfo>>, ApiError> {
    let comment = state
        .feed_service()
        .add_comment(&id, &user.id, &payload.content, payload.parent_id.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(comment)))
}

/// DELETE /comments/{id}
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.feed_service().delete_comment(&id).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Comment deleted".to_string(),
    })))
}
