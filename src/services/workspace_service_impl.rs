//! `SeaORM` implementation of the `WorkspaceService` trait.

use async_trait::async_trait;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::config::EmailConfig;
use crate::db::{NewInvitation, Store};
use crate::entities::workspace_invitations;
use crate::services::mailer::{InvitationEmail, Mailer};
use crate::services::workspace_service::{
    InvitationInfo, MemberInfo, WorkspaceDetail, WorkspaceError, WorkspaceInfo, WorkspaceService,
    WorkspaceSummary,
};

fn slug_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("Invalid regex"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"))
}

pub struct SeaOrmWorkspaceService {
    store: Store,
    mailer: Arc<dyn Mailer>,
    email_config: EmailConfig,
}

impl SeaOrmWorkspaceService {
    #[must_use]
    pub fn new(store: Store, mailer: Arc<dyn Mailer>, email_config: EmailConfig) -> Self {
        Self {
            store,
            mailer,
            email_config,
        }
    }

    /// Drop malformed addresses, the owner's own address, and duplicates.
    /// Comparison is case-insensitive; the first spelling wins.
    fn filter_invitees(owner_email: &str, emails: Vec<String>) -> Vec<String> {
        let owner_lower = owner_email.to_lowercase();
        let mut seen: HashSet<String> = HashSet::new();
        let mut out = Vec::new();

        for email in emails {
            let email = email.trim().to_string();
            if !email_regex().is_match(&email) {
                continue;
            }
            let lower = email.to_lowercase();
            if lower == owner_lower {
                continue;
            }
            if seen.insert(lower) {
                out.push(email);
            }
        }

        out
    }

    /// Fire-and-forget email dispatch; failures are logged and counted but
    /// never affect the already-committed workspace.
    fn dispatch_invitation_emails(
        &self,
        workspace_name: &str,
        inviter_name: &str,
        invitations: Vec<workspace_invitations::Model>,
    ) {
        let join_url_base = self.email_config.join_url_base.trim_end_matches('/').to_string();

        for invitation in invitations {
            let mailer = Arc::clone(&self.mailer);
            let email = InvitationEmail {
                to: invitation.invitee_email.clone(),
                workspace_name: workspace_name.to_string(),
                inviter_name: inviter_name.to_string(),
                join_url: format!("{}/{}", join_url_base, invitation.token),
                expiry_days: self.email_config.invitation_expiry_days,
            };

            tokio::spawn(async move {
                match mailer.send_invitation(email).await {
                    Ok(()) => {
                        metrics::counter!("invitation_emails_sent_total").increment(1);
                    }
                    Err(e) => {
                        metrics::counter!("invitation_emails_failed_total").increment(1);
                        warn!(
                            invitation_id = %invitation.id,
                            "Failed to send invitation email: {e}"
                        );
                    }
                }
            });
        }
    }

    /// Acceptance validation order: exists, not expired, still pending.
    async fn load_actionable_invitation(
        &self,
        token: &str,
    ) -> Result<workspace_invitations::Model, WorkspaceError> {
        let invitation = self
            .store
            .get_invitation_by_token(token)
            .await?
            .ok_or(WorkspaceError::InvitationNotFound)?;

        let now = chrono::Utc::now().to_rfc3339();
        if invitation.expires_at <= now {
            return Err(WorkspaceError::InvitationExpired);
        }

        if invitation.status != "pending" {
            return Err(WorkspaceError::AlreadyResolved);
        }

        Ok(invitation)
    }
}

#[async_trait]
impl WorkspaceService for SeaOrmWorkspaceService {
    async fn create_workspace(
        &self,
        owner_id: &str,
        name: &str,
        slug: &str,
        invitee_emails: Vec<String>,
    ) -> Result<WorkspaceInfo, WorkspaceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkspaceError::Validation(
                "Workspace name is required".to_string(),
            ));
        }

        let slug = slug.trim().to_lowercase();
        if !slug_regex().is_match(&slug) {
            return Err(WorkspaceError::Validation(
                "Slug may only contain lowercase letters, digits and hyphens".to_string(),
            ));
        }

        if self.store.get_workspace_by_slug(&slug).await?.is_some() {
            return Err(WorkspaceError::SlugTaken);
        }

        let owner = self
            .store
            .get_user_by_id(owner_id)
            .await?
            .ok_or_else(|| WorkspaceError::Internal("Owner account missing".to_string()))?;

        let invitees = Self::filter_invitees(&owner.email, invitee_emails);
        let new_invitations = invitees
            .into_iter()
            .map(|email| NewInvitation {
                invitee_email: email,
                role: "member".to_string(),
            })
            .collect();

        let (workspace, invitations) = self
            .store
            .create_workspace(
                name,
                &slug,
                owner_id,
                new_invitations,
                self.email_config.invitation_expiry_days,
            )
            .await?;

        info!(
            workspace_id = %workspace.id,
            slug = %workspace.slug,
            invitations = invitations.len(),
            "Workspace created"
        );

        self.dispatch_invitation_emails(&workspace.name, &owner.display_name, invitations);

        Ok(WorkspaceInfo::from(workspace))
    }

    async fn list_workspaces(
        &self,
        user_id: &str,
    ) -> Result<Vec<WorkspaceSummary>, WorkspaceError> {
        let rows = self.store.list_workspaces_for_user(user_id).await?;

        Ok(rows
            .into_iter()
            .map(|(workspace, role)| WorkspaceSummary {
                workspace: WorkspaceInfo::from(workspace),
                role,
            })
            .collect())
    }

    async fn get_workspace(
        &self,
        slug: &str,
        user_id: &str,
    ) -> Result<WorkspaceDetail, WorkspaceError> {
        let workspace = self
            .store
            .get_workspace_by_slug(&slug.to_lowercase())
            .await?
            .ok_or(WorkspaceError::NotFound)?;

        // Non-members see the same response as for a missing slug.
        self.store
            .get_workspace_member(&workspace.id, user_id)
            .await?
            .ok_or(WorkspaceError::NotFound)?;

        let members = self
            .store
            .list_workspace_members(&workspace.id)
            .await?
            .into_iter()
            .map(|(member, user)| MemberInfo {
                user_id: user.id,
                email: user.email,
                display_name: user.display_name,
                role: member.role,
                joined_at: member.joined_at,
            })
            .collect();

        let invitations = self
            .store
            .list_invitations_for_workspace(&workspace.id)
            .await?
            .into_iter()
            .map(InvitationInfo::from)
            .collect();

        Ok(WorkspaceDetail {
            workspace: WorkspaceInfo::from(workspace),
            members,
            invitations,
        })
    }

    async fn accept_invitation(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<WorkspaceInfo, WorkspaceError> {
        let invitation = self.load_actionable_invitation(token).await?;

        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| WorkspaceError::Internal("User account missing".to_string()))?;

        if !user.email.eq_ignore_ascii_case(&invitation.invitee_email) {
            // Don't reveal that the token exists to the wrong account.
            return Err(WorkspaceError::InvitationNotFound);
        }

        if self
            .store
            .get_workspace_member(&invitation.workspace_id, user_id)
            .await?
            .is_some()
        {
            return Err(WorkspaceError::Validation(
                "You are already a member of this workspace".to_string(),
            ));
        }

        let workspace = self
            .store
            .get_workspace_by_id(&invitation.workspace_id)
            .await?
            .ok_or(WorkspaceError::NotFound)?;

        self.store.accept_invitation(invitation, user_id).await?;

        info!(
            workspace_id = %workspace.id,
            user_id = %user_id,
            "Invitation accepted"
        );

        Ok(WorkspaceInfo::from(workspace))
    }

    async fn reject_invitation(&self, token: &str, user_id: &str) -> Result<(), WorkspaceError> {
        let invitation = self
            .store
            .get_invitation_by_token(token)
            .await?
            .ok_or(WorkspaceError::InvitationNotFound)?;

        if invitation.status != "pending" {
            return Err(WorkspaceError::AlreadyResolved);
        }

        // Any authenticated holder of the token may decline it; neither an
        // email match nor a live expiry is required.
        self.store.reject_invitation(invitation).await?;

        info!(user_id = %user_id, "Invitation rejected");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SeaOrmWorkspaceService;

    #[test]
    fn test_filter_invitees_drops_malformed_and_owner() {
        let out = SeaOrmWorkspaceService::filter_invitees(
            "alice@example.com",
            vec![
                "bob@example.com".to_string(),
                "not-an-email".to_string(),
                "ALICE@example.com".to_string(),
                "carol@example.com".to_string(),
            ],
        );

        assert_eq!(out, vec!["bob@example.com", "carol@example.com"]);
    }

    #[test]
    fn test_filter_invitees_dedupes_case_insensitively() {
        let out = SeaOrmWorkspaceService::filter_invitees(
            "alice@example.com",
            vec![
                "Bob@Example.com".to_string(),
                "bob@example.com".to_string(),
                "BOB@EXAMPLE.COM".to_string(),
            ],
        );

        assert_eq!(out, vec!["Bob@Example.com"]);
    }

    #[test]
    fn test_filter_invitees_empty_input() {
        let out = SeaOrmWorkspaceService::filter_invitees("alice@example.com", vec![]);
        assert!(out.is_empty());
    }
}
