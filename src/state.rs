use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, FeedService, LogMailer, Mailer, ResendMailer, SeaOrmAuthService,
    SeaOrmFeedService, SeaOrmWorkspaceService, WorkspaceService,
};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused across services to enable connection pooling.
fn build_shared_http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .user_agent("Huddle/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub mailer: Arc<dyn Mailer>,

    pub auth_service: Arc<dyn AuthService>,

    pub workspace_service: Arc<dyn WorkspaceService>,

    pub feed_service: Arc<dyn FeedService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let mailer: Arc<dyn Mailer> = if config.email.enabled {
            let http_client = build_shared_http_client()?;
            Arc::new(ResendMailer::new(http_client, config.email.clone()))
        } else {
            Arc::new(LogMailer)
        };

        Self::with_mailer(config, mailer).await
    }

    /// Wire in a custom mailer. Used by tests to capture outbound email.
    pub async fn with_mailer(config: Config, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let workspace_service = Arc::new(SeaOrmWorkspaceService::new(
            store.clone(),
            mailer.clone(),
            config.email.clone(),
        )) as Arc<dyn WorkspaceService>;

        let feed_service = Arc::new(SeaOrmFeedService::new(store.clone())) as Arc<dyn FeedService>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            mailer,
            auth_service,
            workspace_service,
            feed_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
