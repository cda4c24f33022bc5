use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::api::auth::CurrentUser;
use crate::api::types::CreateLabelRequest;
use crate::services::LabelInfo;

/// POST /workspaces/{slug}/labels
pub async fn create_label(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(slug): Path<String>,
    Json(payload): Json<CreateLabelRequest>,
) -> Result<Json<ApiResponse<LabelInfo>>, ApiError> {
    let label = state
        .feed_service()
        .create_label(&slug, &user.id, &payload.label, &payload.color)
        .await?;

    Ok(Json(ApiResponse::success(label)))
}

/// GET /workspaces/{slug}/labels
pub async fn list_labels(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<Vec<LabelInfo>>>, ApiError> {
    let labels = state.feed_service().list_labels(&slug).await?;

    Ok(Json(ApiResponse::success(labels)))
}
