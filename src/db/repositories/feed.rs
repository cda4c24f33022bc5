use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entities::{feed_comments, feeds, prelude::*};
use crate::ids;

pub struct FeedRepository {
    conn: DatabaseConnection,
}

impl FeedRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        workspace_id: &str,
        title: &str,
        content: &str,
        author_id: &str,
    ) -> Result<feeds::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let feed = Feeds::insert(feeds::ActiveModel {
            id: Set(ids::entity_id()),
            workspace_id: Set(workspace_id.to_string()),
            title: Set(title.to_string()),
            content: Set(content.to_string()),
            author_id: Set(author_id.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        })
        .exec_with_returning(&self.conn)
        .await
        .context("Failed to insert feed")?;

        Ok(feed)
    }

    pub async fn get(&self, id: &str) -> Result<Option<feeds::Model>> {
        let feed = Feeds::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query feed by ID")?;

        Ok(feed)
    }

    /// Newest first.
    pub async fn list_for_workspace(&self, workspace_id: &str) -> Result<Vec<feeds::Model>> {
        let feeds = Feeds::find()
            .filter(feeds::Column::WorkspaceId.eq(workspace_id))
            .order_by_desc(feeds::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to query feeds for workspace")?;

        Ok(feeds)
    }

    /// Delete a feed and all of its comments in one transaction, so no
    /// orphaned comments survive regardless of FK pragma state.
    pub async fn delete_with_comments(&self, id: &str) -> Result<bool> {
        let txn = self.conn.begin().await?;

        FeedComments::delete_many()
            .filter(feed_comments::Column::FeedId.eq(id))
            .exec(&txn)
            .await?;

        let res = Feeds::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        Ok(res.rows_affected > 0)
    }

    pub async fn add_comment(
        &self,
        feed_id: &str,
        content: &str,
        author_id: &str,
        parent_id: Option<&str>,
    ) -> Result<feed_comments::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let comment = FeedComments::insert(feed_comments::ActiveModel {
            id: Set(ids::entity_id()),
            feed_id: Set(feed_id.to_string()),
            content: Set(content.to_string()),
            author_id: Set(author_id.to_string()),
            parent_id: Set(parent_id.map(ToString::to_string)),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        })
        .exec_with_returning(&self.conn)
        .await
        .context("Failed to insert comment")?;

        Ok(comment)
    }

    pub async fn get_comment(&self, id: &str) -> Result<Option<feed_comments::Model>> {
        let comment = FeedComments::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query comment by ID")?;

        Ok(comment)
    }

    /// Oldest first; threading is reconstructed from `parent_id` by callers.
    pub async fn list_comments(&self, feed_id: &str) -> Result<Vec<feed_comments::Model>> {
        let comments = FeedComments::find()
            .filter(feed_comments::Column::FeedId.eq(feed_id))
            .order_by_asc(feed_comments::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to query comments for feed")?;

        Ok(comments)
    }

    pub async fn comment_count(&self, feed_id: &str) -> Result<u64> {
        let count = FeedComments::find()
            .filter(feed_comments::Column::FeedId.eq(feed_id))
            .count(&self.conn)
            .await
            .context("Failed to count comments")?;

        Ok(count)
    }

    /// Delete a comment together with its direct replies.
    pub async fn delete_comment(&self, id: &str) -> Result<bool> {
        let txn = self.conn.begin().await?;

        FeedComments::delete_many()
            .filter(feed_comments::Column::ParentId.eq(id))
            .exec(&txn)
            .await?;

        let res = FeedComments::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        Ok(res.rows_affected > 0)
    }
}
