//! Outbound email delivery for workspace invitations.
//!
//! Uses a Resend-compatible HTTP API. When email is disabled in config the
//! `LogMailer` is wired in instead and invitations are only logged.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::EmailConfig;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Email request failed: {0}")]
    Request(String),

    #[error("Email provider returned {status}: {body}")]
    Provider { status: u16, body: String },
}

/// A workspace invitation ready for delivery.
#[derive(Debug, Clone)]
pub struct InvitationEmail {
    pub to: String,
    pub workspace_name: String,
    pub inviter_name: String,
    pub join_url: String,
    pub expiry_days: i64,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_invitation(&self, email: InvitationEmail) -> Result<(), MailerError>;
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: String,
    html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

pub struct ResendMailer {
    client: reqwest::Client,
    config: EmailConfig,
}

impl ResendMailer {
    #[must_use]
    pub const fn new(client: reqwest::Client, config: EmailConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send_invitation(&self, email: InvitationEmail) -> Result<(), MailerError> {
        let subject = format!(
            "{} invited you to join {}",
            email.inviter_name, email.workspace_name
        );

        let html = format!(
            "<p>{inviter} has invited you to collaborate in the <strong>{workspace}</strong> workspace.</p>\
             <p><a href=\"{url}\">Accept the invitation</a></p>\
             <p>This invitation expires in {days} days. If you weren't expecting it, you can ignore this email.</p>",
            inviter = email.inviter_name,
            workspace = email.workspace_name,
            url = email.join_url,
            days = email.expiry_days,
        );

        let body = SendEmailRequest {
            from: &self.config.from_address,
            to: vec![&email.to],
            subject,
            html,
            reply_to: self.config.reply_to_address.as_deref(),
        };

        let url = format!("{}/emails", self.config.api_base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailerError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailerError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Stand-in used when email delivery is disabled.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_invitation(&self, email: InvitationEmail) -> Result<(), MailerError> {
        info!(
            to = %email.to,
            workspace = %email.workspace_name,
            join_url = %email.join_url,
            "Email disabled; invitation not sent"
        );
        Ok(())
    }
}
