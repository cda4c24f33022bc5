use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entities::{prelude::*, workspace_invitations, workspace_members};
use crate::ids;

pub struct InvitationRepository {
    conn: DatabaseConnection,
}

impl InvitationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_token(&self, token: &str) -> Result<Option<workspace_invitations::Model>> {
        let invitation = WorkspaceInvitations::find()
            .filter(workspace_invitations::Column::Token.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query invitation by token")?;

        Ok(invitation)
    }

    pub async fn list_for_workspace(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<workspace_invitations::Model>> {
        let invitations = WorkspaceInvitations::find()
            .filter(workspace_invitations::Column::WorkspaceId.eq(workspace_id))
            .order_by_asc(workspace_invitations::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to query invitations for workspace")?;

        Ok(invitations)
    }

    /// Mark the invitation accepted and enroll the user, atomically.
    pub async fn accept(
        &self,
        invitation: workspace_invitations::Model,
        user_id: &str,
    ) -> Result<workspace_members::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let workspace_id = invitation.workspace_id.clone();
        let role = invitation.role.clone();

        let txn = self.conn.begin().await?;

        let mut active: workspace_invitations::ActiveModel = invitation.into();
        active.status = Set("accepted".to_string());
        active.updated_at = Set(now.clone());
        active.update(&txn).await?;

        let member = WorkspaceMembers::insert(workspace_members::ActiveModel {
            id: Set(ids::entity_id()),
            workspace_id: Set(workspace_id),
            user_id: Set(user_id.to_string()),
            role: Set(role),
            joined_at: Set(now.clone()),
            updated_at: Set(now),
        })
        .exec_with_returning(&txn)
        .await
        .context("Failed to insert membership for accepted invitation")?;

        txn.commit().await?;

        Ok(member)
    }

    pub async fn mark_rejected(&self, invitation: workspace_invitations::Model) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut active: workspace_invitations::ActiveModel = invitation.into();
        active.status = Set("rejected".to_string());
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        Ok(())
    }
}
