//! Domain service for workspaces, memberships and invitations.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to workspace operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Workspace not found")]
    NotFound,

    #[error("Slug is already in use")]
    SlugTaken,

    #[error("Invitation not found")]
    InvitationNotFound,

    #[error("Invitation has expired")]
    InvitationExpired,

    #[error("Invitation has already been resolved")]
    AlreadyResolved,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for WorkspaceError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for WorkspaceError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceInfo {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub owner_id: String,
    pub created_at: String,
}

impl From<crate::entities::workspaces::Model> for WorkspaceInfo {
    fn from(model: crate::entities::workspaces::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            owner_id: model.owner_id,
            created_at: model.created_at,
        }
    }
}

/// A workspace as seen from a member's perspective.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceSummary {
    #[serde(flatten)]
    pub workspace: WorkspaceInfo,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberInfo {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub joined_at: String,
}

/// Invitation as exposed over the API. The join token is deliberately
/// omitted; it only travels in the invitation email.
#[derive(Debug, Clone, Serialize)]
pub struct InvitationInfo {
    pub id: String,
    pub invitee_email: String,
    pub role: String,
    pub status: String,
    pub expires_at: String,
    pub created_at: String,
}

impl From<crate::entities::workspace_invitations::Model> for InvitationInfo {
    fn from(model: crate::entities::workspace_invitations::Model) -> Self {
        Self {
            id: model.id,
            invitee_email: model.invitee_email,
            role: model.role,
            status: model.status,
            expires_at: model.expires_at,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceDetail {
    #[serde(flatten)]
    pub workspace: WorkspaceInfo,
    pub members: Vec<MemberInfo>,
    pub invitations: Vec<InvitationInfo>,
}

/// Domain service trait for workspaces.
#[async_trait::async_trait]
pub trait WorkspaceService: Send + Sync {
    /// Creates a workspace owned by `owner_id`, enrolls the owner as admin,
    /// and issues invitations for the given emails. Invitation emails are
    /// dispatched after the transaction commits and never block the request.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::SlugTaken`] when the slug is already in use.
    async fn create_workspace(
        &self,
        owner_id: &str,
        name: &str,
        slug: &str,
        invitee_emails: Vec<String>,
    ) -> Result<WorkspaceInfo, WorkspaceError>;

    /// Lists workspaces the user is a member of.
    async fn list_workspaces(&self, user_id: &str)
    -> Result<Vec<WorkspaceSummary>, WorkspaceError>;

    /// Full workspace view. Only members can see it; non-members get
    /// [`WorkspaceError::NotFound`], same as a missing slug.
    async fn get_workspace(
        &self,
        slug: &str,
        user_id: &str,
    ) -> Result<WorkspaceDetail, WorkspaceError>;

    /// Accepts a pending invitation by token. The caller's email must match
    /// the invitee email (case-insensitive).
    async fn accept_invitation(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<WorkspaceInfo, WorkspaceError>;

    /// Declines a pending invitation by token.
    async fn reject_invitation(&self, token: &str, user_id: &str)
    -> Result<(), WorkspaceError>;
}
