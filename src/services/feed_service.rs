//! Domain service for feeds, threaded comments and labels.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to feed operations.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Workspace not found")]
    WorkspaceNotFound,

    #[error("Feed not found")]
    FeedNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for FeedError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for FeedError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedInfo {
    pub id: String,
    pub workspace_id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub created_at: String,
}

impl From<crate::entities::feeds::Model> for FeedInfo {
    fn from(model: crate::entities::feeds::Model) -> Self {
        Self {
            id: model.id,
            workspace_id: model.workspace_id,
            title: model.title,
            content: model.content,
            author_id: model.author_id,
            created_at: model.created_at,
        }
    }
}

/// Flat comment row; clients rebuild the thread from `parent_id`.
#[derive(Debug, Clone, Serialize)]
pub struct CommentInfo {
    pub id: String,
    pub feed_id: String,
    pub content: String,
    pub author_id: String,
    pub parent_id: Option<String>,
    pub created_at: String,
}

impl From<crate::entities::feed_comments::Model> for CommentInfo {
    fn from(model: crate::entities::feed_comments::Model) -> Self {
        Self {
            id: model.id,
            feed_id: model.feed_id,
            content: model.content,
            author_id: model.author_id,
            parent_id: model.parent_id,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedDetail {
    #[serde(flatten)]
    pub feed: FeedInfo,
    pub comments: Vec<CommentInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelInfo {
    pub id: String,
    pub workspace_id: String,
    pub label: String,
    pub color: String,
    pub author_id: String,
    pub created_at: String,
}

impl From<crate::entities::feed_labels::Model> for LabelInfo {
    fn from(model: crate::entities::feed_labels::Model) -> Self {
        Self {
            id: model.id,
            workspace_id: model.workspace_id,
            label: model.label,
            color: model.color,
            author_id: model.author_id,
            created_at: model.created_at,
        }
    }
}

/// Domain service trait for feeds.
#[async_trait::async_trait]
pub trait FeedService: Send + Sync {
    async fn create_feed(
        &self,
        slug: &str,
        author_id: &str,
        title: &str,
        content: &str,
    ) -> Result<FeedInfo, FeedError>;

    /// Feeds for a workspace, newest first.
    async fn list_feeds(&self, slug: &str) -> Result<Vec<FeedInfo>, FeedError>;

    /// A feed with its full comment list.
    async fn get_feed(&self, feed_id: &str) -> Result<FeedDetail, FeedError>;

    /// Deletes a feed along with all of its comments.
    async fn delete_feed(&self, feed_id: &str) -> Result<(), FeedError>;

    /// Adds a comment, optionally as a reply. The parent comment must belong
    /// to the same feed.
    async fn add_comment(
        &self,
        feed_id: &str,
        author_id: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> Result<CommentInfo, FeedError>;

    async fn delete_comment(&self, comment_id: &str) -> Result<(), FeedError>;

    async fn create_label(
        &self,
        slug: &str,
        author_id: &str,
        label: &str,
        color: &str,
    ) -> Result<LabelInfo, FeedError>;

    async fn list_labels(&self, slug: &str) -> Result<Vec<LabelInfo>, FeedError>;
}
