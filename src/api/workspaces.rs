use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::api::auth::CurrentUser;
use crate::api::types::{CreateWorkspaceRequest, InvitationActionRequest, MessageResponse};
use crate::services::{WorkspaceDetail, WorkspaceInfo, WorkspaceSummary};

/// POST /workspaces
/// Create a workspace and send invitations
pub async fn create_workspace(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<CreateWorkspaceRequest>,
) -> Result<Json<ApiResponse<WorkspaceInfo>>, ApiError> {
    let workspace = state
        .workspace_service()
        .create_workspace(&user.id, &payload.name, &payload.slug, payload.invitee_emails)
        .await?;

    Ok(Json(ApiResponse::success(workspace)))
}

/// GET /workspaces
/// List workspaces the current user belongs to
pub async fn list_workspaces(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<WorkspaceSummary>>>, ApiError> {
    let workspaces = state.workspace_service().list_workspaces(&user.id).await?;

    Ok(Json(ApiResponse::success(workspaces)))
}

/// GET /workspaces/{slug}
/// Workspace detail with members and invitations (members only)
pub async fn get_workspace(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<WorkspaceDetail>>, ApiError> {
    let detail = state
        .workspace_service()
        .get_workspace(&slug, &user.id)
        .await?;

    Ok(Json(ApiResponse::success(detail)))
}

/// POST /workspace-invitations/accept
/// Accept a pending invitation by token
pub async fn accept_invitation(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<InvitationActionRequest>,
) -> Result<Json<ApiResponse<WorkspaceInfo>>, ApiError> {
    let workspace = state
        .workspace_service()
        .accept_invitation(&payload.token, &user.id)
        .await?;

    Ok(Json(ApiResponse::success(workspace)))
}

/// POST /workspace-invitations/reject
/// Decline a pending invitation by token
pub async fn reject_invitation(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<InvitationActionRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .workspace_service()
        .reject_invitation(&payload.token, &user.id)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Invitation rejected".to_string(),
    })))
}
