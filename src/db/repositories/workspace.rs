use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{prelude::*, users, workspace_invitations, workspace_members, workspaces};
use crate::ids;

/// Invitation input for workspace creation. Token and timestamps are
/// assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub invitee_email: String,
    pub role: String,
}

pub struct WorkspaceRepository {
    conn: DatabaseConnection,
}

impl WorkspaceRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<workspaces::Model>> {
        let workspace = Workspaces::find()
            .filter(workspaces::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query workspace by slug")?;

        Ok(workspace)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<workspaces::Model>> {
        let workspace = Workspaces::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query workspace by ID")?;

        Ok(workspace)
    }

    /// Create a workspace, enroll the owner as admin, and record the
    /// invitation rows, all in one transaction. Returns the workspace and
    /// the created invitations (tokens included, for email dispatch).
    pub async fn create(
        &self,
        name: &str,
        slug: &str,
        owner_id: &str,
        invitations: Vec<NewInvitation>,
        expiry_days: i64,
    ) -> Result<(workspaces::Model, Vec<workspace_invitations::Model>)> {
        let now = chrono::Utc::now();
        let now_str = now.to_rfc3339();
        let expires_at = (now + chrono::Duration::days(expiry_days)).to_rfc3339();

        let txn = self.conn.begin().await?;

        let workspace = Workspaces::insert(workspaces::ActiveModel {
            id: Set(ids::entity_id()),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            owner_id: Set(owner_id.to_string()),
            created_at: Set(now_str.clone()),
            updated_at: Set(now_str.clone()),
        })
        .exec_with_returning(&txn)
        .await
        .context("Failed to insert workspace")?;

        WorkspaceMembers::insert(workspace_members::ActiveModel {
            id: Set(ids::entity_id()),
            workspace_id: Set(workspace.id.clone()),
            user_id: Set(owner_id.to_string()),
            role: Set("admin".to_string()),
            joined_at: Set(now_str.clone()),
            updated_at: Set(now_str.clone()),
        })
        .exec(&txn)
        .await
        .context("Failed to insert owner membership")?;

        let mut created = Vec::with_capacity(invitations.len());
        for invitation in invitations {
            let model = WorkspaceInvitations::insert(workspace_invitations::ActiveModel {
                id: Set(ids::invitation_id()),
                workspace_id: Set(workspace.id.clone()),
                inviter_id: Set(owner_id.to_string()),
                invitee_email: Set(invitation.invitee_email),
                token: Set(ids::invitation_token()),
                role: Set(invitation.role),
                status: Set("pending".to_string()),
                expires_at: Set(expires_at.clone()),
                created_at: Set(now_str.clone()),
                updated_at: Set(now_str.clone()),
            })
            .exec_with_returning(&txn)
            .await
            .context("Failed to insert invitation")?;

            created.push(model);
        }

        txn.commit().await?;

        Ok((workspace, created))
    }

    /// Workspaces the user belongs to, with their role in each.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<(workspaces::Model, String)>> {
        let memberships = WorkspaceMembers::find()
            .filter(workspace_members::Column::UserId.eq(user_id))
            .find_also_related(Workspaces)
            .order_by_asc(workspace_members::Column::JoinedAt)
            .all(&self.conn)
            .await
            .context("Failed to query workspaces for user")?;

        Ok(memberships
            .into_iter()
            .filter_map(|(member, workspace)| workspace.map(|w| (w, member.role)))
            .collect())
    }

    pub async fn get_member(
        &self,
        workspace_id: &str,
        user_id: &str,
    ) -> Result<Option<workspace_members::Model>> {
        let member = WorkspaceMembers::find()
            .filter(workspace_members::Column::WorkspaceId.eq(workspace_id))
            .filter(workspace_members::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query workspace membership")?;

        Ok(member)
    }

    /// Members of a workspace joined with their user rows.
    pub async fn list_members(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<(workspace_members::Model, users::Model)>> {
        let members = WorkspaceMembers::find()
            .filter(workspace_members::Column::WorkspaceId.eq(workspace_id))
            .find_also_related(Users)
            .order_by_asc(workspace_members::Column::JoinedAt)
            .all(&self.conn)
            .await
            .context("Failed to query workspace members")?;

        Ok(members
            .into_iter()
            .filter_map(|(member, user)| user.map(|u| (member, u)))
            .collect())
    }
}
