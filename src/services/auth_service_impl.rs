//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::services::auth_service::{AuthError, AuthService, LoginResult, UserInfo};

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"))
}

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn validate_password(&self, password: &str) -> Result<(), AuthError> {
        if password.len() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.security.min_password_length
            )));
        }

        let has_letter = password.chars().any(char::is_alphabetic);
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        if !has_letter || !has_digit {
            return Err(AuthError::Validation(
                "Password must contain at least one letter and one digit".to_string(),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<UserInfo, AuthError> {
        let email = email.trim();
        let display_name = display_name.trim();

        if !email_regex().is_match(email) {
            return Err(AuthError::Validation(
                "A valid email address is required".to_string(),
            ));
        }
        if display_name.is_empty() {
            return Err(AuthError::Validation(
                "Display name is required".to_string(),
            ));
        }
        self.validate_password(password)?;

        if self.store.get_user_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        // A concurrent registration can still slip past the lookup and hit
        // the unique index on email.
        let user = match self
            .store
            .create_user(email, display_name, password, &self.security)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                let unique_violation = e
                    .downcast_ref::<sea_orm::DbErr>()
                    .and_then(sea_orm::DbErr::sql_err)
                    .is_some_and(|s| matches!(s, sea_orm::SqlErr::UniqueConstraintViolation(_)));

                if unique_violation {
                    return Err(AuthError::EmailTaken);
                }
                return Err(e.into());
            }
        };

        tracing::info!(user_id = %user.id, "User registered");

        Ok(UserInfo::from(user))
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let user = self
            .store
            .verify_user_password(email.trim(), password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let session = self
            .store
            .create_session(&user.id, self.security.session_ttl_minutes)
            .await?;

        Ok(LoginResult {
            user: UserInfo::from(user),
            token: session.id,
            expires_at: session.expires_at,
        })
    }

    async fn resolve_token(&self, token: &str) -> Result<Option<UserInfo>, AuthError> {
        let user = self.store.resolve_session(token).await?;
        Ok(user.map(UserInfo::from))
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.store.delete_session(token).await?;
        Ok(())
    }

    async fn get_user_info(&self, user_id: &str) -> Result<UserInfo, AuthError> {
        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserInfo::from(user))
    }
}
