use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::{prelude::*, sessions, users};
use crate::ids;

pub struct SessionRepository {
    conn: DatabaseConnection,
}

impl SessionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Create a session for a user; returns the opaque token.
    pub async fn create(&self, user_id: &str, ttl_minutes: u64) -> Result<sessions::Model> {
        let now = chrono::Utc::now();
        let ttl = i64::try_from(ttl_minutes).unwrap_or(i64::MAX);
        let expires_at = (now + chrono::Duration::minutes(ttl)).to_rfc3339();

        let session = sessions::ActiveModel {
            id: Set(ids::session_token()),
            user_id: Set(user_id.to_string()),
            expires_at: Set(expires_at),
            created_at: Set(now.to_rfc3339()),
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert session")?;

        Ok(session)
    }

    /// Resolve a token to its user. Expired sessions are deleted on sight
    /// and resolve to None.
    pub async fn resolve(&self, token: &str) -> Result<Option<users::Model>> {
        let found = Sessions::find_by_id(token)
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to query session")?;

        let Some((session, user)) = found else {
            return Ok(None);
        };

        let now = chrono::Utc::now().to_rfc3339();
        if session.expires_at <= now {
            Sessions::delete_by_id(&session.id).exec(&self.conn).await?;
            return Ok(None);
        }

        Ok(user)
    }

    pub async fn delete(&self, token: &str) -> Result<bool> {
        let res = Sessions::delete_by_id(token)
            .exec(&self.conn)
            .await
            .context("Failed to delete session")?;

        Ok(res.rows_affected > 0)
    }
}
