use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{feed_comments, feed_labels, feeds, users, workspace_invitations,
    workspace_members, workspaces};

pub mod migrator;
pub mod repositories;

pub use repositories::user::User;
pub use repositories::workspace::NewInvitation;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn session_repo(&self) -> repositories::session::SessionRepository {
        repositories::session::SessionRepository::new(self.conn.clone())
    }

    fn workspace_repo(&self) -> repositories::workspace::WorkspaceRepository {
        repositories::workspace::WorkspaceRepository::new(self.conn.clone())
    }

    fn invitation_repo(&self) -> repositories::invitation::InvitationRepository {
        repositories::invitation::InvitationRepository::new(self.conn.clone())
    }

    fn feed_repo(&self) -> repositories::feed::FeedRepository {
        repositories::feed::FeedRepository::new(self.conn.clone())
    }

    fn label_repo(&self) -> repositories::label::LabelRepository {
        repositories::label::LabelRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn create_user(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
        config: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo()
            .create(email, display_name, password, config)
            .await
    }

    pub async fn verify_user_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>> {
        self.user_repo().verify_password(email, password).await
    }

    // ========== Sessions ==========

    pub async fn create_session(
        &self,
        user_id: &str,
        ttl_minutes: u64,
    ) -> Result<crate::entities::sessions::Model> {
        self.session_repo().create(user_id, ttl_minutes).await
    }

    pub async fn resolve_session(&self, token: &str) -> Result<Option<users::Model>> {
        self.session_repo().resolve(token).await
    }

    pub async fn delete_session(&self, token: &str) -> Result<bool> {
        self.session_repo().delete(token).await
    }

    // ========== Workspaces ==========

    pub async fn get_workspace_by_slug(&self, slug: &str) -> Result<Option<workspaces::Model>> {
        self.workspace_repo().get_by_slug(slug).await
    }

    pub async fn get_workspace_by_id(&self, id: &str) -> Result<Option<workspaces::Model>> {
        self.workspace_repo().get_by_id(id).await
    }

    pub async fn create_workspace(
        &self,
        name: &str,
        slug: &str,
        owner_id: &str,
        invitations: Vec<NewInvitation>,
        expiry_days: i64,
    ) -> Result<(workspaces::Model, Vec<workspace_invitations::Model>)> {
        self.workspace_repo()
            .create(name, slug, owner_id, invitations, expiry_days)
            .await
    }

    pub async fn list_workspaces_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<(workspaces::Model, String)>> {
        self.workspace_repo().list_for_user(user_id).await
    }

    pub async fn get_workspace_member(
        &self,
        workspace_id: &str,
        user_id: &str,
    ) -> Result<Option<workspace_members::Model>> {
        self.workspace_repo().get_member(workspace_id, user_id).await
    }

    pub async fn list_workspace_members(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<(workspace_members::Model, users::Model)>> {
        self.workspace_repo().list_members(workspace_id).await
    }

    // ========== Invitations ==========

    pub async fn get_invitation_by_token(
        &self,
        token: &str,
    ) -> Result<Option<workspace_invitations::Model>> {
        self.invitation_repo().get_by_token(token).await
    }

    pub async fn list_invitations_for_workspace(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<workspace_invitations::Model>> {
        self.invitation_repo().list_for_workspace(workspace_id).await
    }

    pub async fn accept_invitation(
        &self,
        invitation: workspace_invitations::Model,
        user_id: &str,
    ) -> Result<workspace_members::Model> {
        self.invitation_repo().accept(invitation, user_id).await
    }

    pub async fn reject_invitation(
        &self,
        invitation: workspace_invitations::Model,
    ) -> Result<()> {
        self.invitation_repo().mark_rejected(invitation).await
    }

    // ========== Feeds ==========

    pub async fn create_feed(
        &self,
        workspace_id: &str,
        title: &str,
        content: &str,
        author_id: &str,
    ) -> Result<feeds::Model> {
        self.feed_repo()
            .create(workspace_id, title, content, author_id)
            .await
    }

    pub async fn get_feed(&self, id: &str) -> Result<Option<feeds::Model>> {
        self.feed_repo().get(id).await
    }

    pub async fn list_feeds_for_workspace(&self, workspace_id: &str) -> Result<Vec<feeds::Model>> {
        self.feed_repo().list_for_workspace(workspace_id).await
    }

    pub async fn delete_feed(&self, id: &str) -> Result<bool> {
        self.feed_repo().delete_with_comments(id).await
    }

    pub async fn add_feed_comment(
        &self,
        feed_id: &str,
        content: &str,
        author_id: &str,
        parent_id: Option<&str>,
    ) -> Result<feed_comments::Model> {
        self.feed_repo()
            .add_comment(feed_id, content, author_id, parent_id)
            .await
    }

    pub async fn get_feed_comment(&self, id: &str) -> Result<Option<feed_comments::Model>> {
        self.feed_repo().get_comment(id).await
    }

    pub async fn list_feed_comments(&self, feed_id: &str) -> Result<Vec<feed_comments::Model>> {
        self.feed_repo().list_comments(feed_id).await
    }

    pub async fn count_feed_comments(&self, feed_id: &str) -> Result<u64> {
        self.feed_repo().comment_count(feed_id).await
    }

    pub async fn delete_feed_comment(&self, id: &str) -> Result<bool> {
        self.feed_repo().delete_comment(id).await
    }

    // ========== Labels ==========

    pub async fn create_label(
        &self,
        workspace_id: &str,
        label: &str,
        color: &str,
        author_id: &str,
    ) -> Result<feed_labels::Model> {
        self.label_repo()
            .create(workspace_id, label, color, author_id)
            .await
    }

    pub async fn list_labels_for_workspace(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<feed_labels::Model>> {
        self.label_repo().list_for_workspace(workspace_id).await
    }
}
