use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entities::{feed_labels, prelude::*};
use crate::ids;

pub struct LabelRepository {
    conn: DatabaseConnection,
}

impl LabelRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        workspace_id: &str,
        label: &str,
        color: &str,
        author_id: &str,
    ) -> Result<feed_labels::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let created = FeedLabels::insert(feed_labels::ActiveModel {
            id: Set(ids::entity_id()),
            workspace_id: Set(workspace_id.to_string()),
            label: Set(label.to_string()),
            color: Set(color.to_string()),
            author_id: Set(author_id.to_string()),
            created_at: Set(now),
        })
        .exec_with_returning(&self.conn)
        .await
        .context("Failed to insert label")?;

        Ok(created)
    }

    pub async fn list_for_workspace(&self, workspace_id: &str) -> Result<Vec<feed_labels::Model>> {
        let labels = FeedLabels::find()
            .filter(feed_labels::Column::WorkspaceId.eq(workspace_id))
            .order_by_asc(feed_labels::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to query labels for workspace")?;

        Ok(labels)
    }
}
