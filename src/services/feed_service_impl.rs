//! `SeaORM` implementation of the `FeedService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::services::feed_service::{
    CommentInfo, FeedDetail, FeedError, FeedInfo, FeedService, LabelInfo,
};

pub struct SeaOrmFeedService {
    store: Store,
}

impl SeaOrmFeedService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn workspace_id_for_slug(&self, slug: &str) -> Result<String, FeedError> {
        let workspace = self
            .store
            .get_workspace_by_slug(&slug.to_lowercase())
            .await?
            .ok_or(FeedError::WorkspaceNotFound)?;

        Ok(workspace.id)
    }
}

#[async_trait]
impl FeedService for SeaOrmFeedService {
    async fn create_feed(
        &self,
        slug: &str,
        author_id: &str,
        title: &str,
        content: &str,
    ) -> Result<FeedInfo, FeedError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(FeedError::Validation("Title is required".to_string()));
        }
        if content.trim().is_empty() {
            return Err(FeedError::Validation("Content is required".to_string()));
        }

        let workspace_id = self.workspace_id_for_slug(slug).await?;

        let feed = self
            .store
            .create_feed(&workspace_id, title, content, author_id)
            .await?;

        info!(feed_id = %feed.id, workspace_id = %workspace_id, "Feed created");

        Ok(FeedInfo::from(feed))
    }

    async fn list_feeds(&self, slug: &str) -> Result<Vec<FeedInfo>, FeedError> {
        let workspace_id = self.workspace_id_for_slug(slug).await?;
        let feeds = self.store.list_feeds_for_workspace(&workspace_id).await?;

        Ok(feeds.into_iter().map(FeedInfo::from).collect())
    }

    async fn get_feed(&self, feed_id: &str) -> Result<FeedDetail, FeedError> {
        let feed = self
            .store
            .get_feed(feed_id)
            .await?
            .ok_or(FeedError::FeedNotFound)?;

        let comments = self
            .store
            .list_feed_comments(feed_id)
            .await?
            .into_iter()
            .map(CommentInfo::from)
            .collect();

        Ok(FeedDetail {
            feed: FeedInfo::from(feed),
            comments,
        })
    }

    async fn delete_feed(&self, feed_id: &str) -> Result<(), FeedError> {
        let deleted = self.store.delete_feed(feed_id).await?;
        if !deleted {
            return Err(FeedError::FeedNotFound);
        }

        info!(feed_id = %feed_id, "Feed deleted");

        Ok(())
    }

    async fn add_comment(
        &self,
        feed_id: &str,
        author_id: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> Result<CommentInfo, FeedError> {
        if content.trim().is_empty() {
            return Err(FeedError::Validation("Content is required".to_string()));
        }

        self.store
            .get_feed(feed_id)
            .await?
            .ok_or(FeedError::FeedNotFound)?;

        if let Some(parent_id) = parent_id {
            let parent = self
                .store
                .get_feed_comment(parent_id)
                .await?
                .ok_or(FeedError::CommentNotFound)?;

            if parent.feed_id != feed_id {
                return Err(FeedError::Validation(
                    "Parent comment belongs to a different feed".to_string(),
                ));
            }
        }

        let comment = self
            .store
            .add_feed_comment(feed_id, content, author_id, parent_id)
            .await?;

        Ok(CommentInfo::from(comment))
    }

    async fn delete_comment(&self, comment_id: &str) -> Result<(), FeedError> {
        let deleted = self.store.delete_feed_comment(comment_id).await?;
        if !deleted {
            return Err(FeedError::CommentNotFound);
        }

        Ok(())
    }

    async fn create_label(
        &self,
        slug: &str,
        author_id: &str,
        label: &str,
        color: &str,
    ) -> Result<LabelInfo, FeedError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(FeedError::Validation("Label is required".to_string()));
        }
        let color = color.trim();
        if color.is_empty() {
            return Err(FeedError::Validation("Color is required".to_string()));
        }

        let workspace_id = self.workspace_id_for_slug(slug).await?;

        let created = self
            .store
            .create_label(&workspace_id, label, color, author_id)
            .await?;

        Ok(LabelInfo::from(created))
    }

    async fn list_labels(&self, slug: &str) -> Result<Vec<LabelInfo>, FeedError> {
        let workspace_id = self.workspace_id_for_slug(slug).await?;
        let labels = self.store.list_labels_for_workspace(&workspace_id).await?;

        Ok(labels.into_iter().map(LabelInfo::from).collect())
    }
}
