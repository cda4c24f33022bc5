use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use huddle::config::Config;
use huddle::db::Store;
use huddle::services::{InvitationEmail, Mailer, MailerError};
use huddle::state::SharedState;
use sea_orm::{ActiveModelTrait, Set};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

async fn spawn_app() -> (Router, Store) {
    let db_path = std::env::temp_dir().join(format!("huddle-test-{}.db", uuid::Uuid::new_v4()));
    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.server.secure_cookies = false;

    let state = huddle::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let store = state.store().clone();
    (huddle::api::router(state).await, store)
}

async fn spawn_app_with_mailer(mailer: Arc<dyn Mailer>) -> (Router, Store) {
    let db_path = std::env::temp_dir().join(format!("huddle-test-{}.db", uuid::Uuid::new_v4()));
    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.server.secure_cookies = false;

    let shared = SharedState::with_mailer(config, mailer)
        .await
        .expect("Failed to create shared state");
    let store = shared.store.clone();
    let state = huddle::api::create_app_state(Arc::new(shared), None)
        .await
        .expect("Failed to create app state");
    (huddle::api::router(state).await, store)
}

#[derive(Default)]
struct CapturingMailer {
    sent: Mutex<Vec<InvitationEmail>>,
}

#[async_trait::async_trait]
impl Mailer for CapturingMailer {
    async fn send_invitation(&self, email: InvitationEmail) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

async fn post_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let response = app
        .clone()
        .oneshot(
            builder
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Register a user and return their bearer token.
async fn signup(app: &Router, email: &str, display_name: &str) -> String {
    let (status, _) = post_json(
        app,
        "/api/users/register",
        None,
        serde_json::json!({
            "email": email,
            "display_name": display_name,
            "password": "hunter2hunter2",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        app,
        "/api/users/login",
        None,
        serde_json::json!({ "email": email, "password": "hunter2hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_workspace(
    app: &Router,
    token: &str,
    name: &str,
    slug: &str,
    invitees: &[&str],
) -> (StatusCode, serde_json::Value) {
    post_json(
        app,
        "/api/workspaces",
        Some(token),
        serde_json::json!({
            "name": name,
            "slug": slug,
            "invitee_emails": invitees,
        }),
    )
    .await
}

#[tokio::test]
async fn test_create_workspace_enrolls_owner_and_filters_invitees() {
    let (app, store) = spawn_app().await;
    let alice = signup(&app, "alice@example.com", "Alice").await;

    let (status, body) = create_workspace(
        &app,
        &alice,
        "Acme Inc",
        "acme",
        &[
            "bob@example.com",
            "not-an-email",
            "ALICE@example.com",
            "bob@example.com",
        ],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], "acme");
    let workspace_id = body["data"]["id"].as_str().unwrap().to_string();

    // Owner's address and the malformed/duplicate entries are dropped
    let invitations = store
        .list_invitations_for_workspace(&workspace_id)
        .await
        .unwrap();
    assert_eq!(invitations.len(), 1);
    assert_eq!(invitations[0].invitee_email, "bob@example.com");
    assert_eq!(invitations[0].status, "pending");
    assert_eq!(invitations[0].token.len(), 20);

    // Owner is an admin member
    let workspaces = store.list_workspaces_for_user(&invitations[0].inviter_id).await.unwrap();
    assert_eq!(workspaces.len(), 1);
    assert_eq!(workspaces[0].1, "admin");
}

#[tokio::test]
async fn test_slug_conflict_leaves_state_unchanged() {
    let (app, store) = spawn_app().await;
    let alice = signup(&app, "alice@example.com", "Alice").await;

    let (status, body) =
        create_workspace(&app, &alice, "Acme Inc", "acme", &["bob@example.com"]).await;
    assert_eq!(status, StatusCode::OK);
    let workspace_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) =
        create_workspace(&app, &alice, "Acme Clone", "ACME", &["carol@example.com"]).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // First workspace is untouched, no extra invitations appeared
    let workspace = store.get_workspace_by_slug("acme").await.unwrap().unwrap();
    assert_eq!(workspace.id, workspace_id);
    assert_eq!(workspace.name, "Acme Inc");
    let invitations = store
        .list_invitations_for_workspace(&workspace_id)
        .await
        .unwrap();
    assert_eq!(invitations.len(), 1);
}

#[tokio::test]
async fn test_invalid_slug_rejected() {
    let (app, _store) = spawn_app().await;
    let alice = signup(&app, "alice@example.com", "Alice").await;

    let (status, _) = create_workspace(&app, &alice, "Acme", "not a slug!", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = create_workspace(&app, &alice, "Acme", "-leading-hyphen", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_workspace_detail_members_only() {
    let (app, _store) = spawn_app().await;
    let alice = signup(&app, "alice@example.com", "Alice").await;
    let bob = signup(&app, "bob@example.com", "Bob").await;

    create_workspace(&app, &alice, "Acme Inc", "acme", &[]).await;

    let (status, body) = get_json(&app, "/api/workspaces/acme", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["members"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["members"][0]["role"], "admin");

    // Non-member sees the same as a missing slug
    let (status, _) = get_json(&app, "/api/workspaces/acme", Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_json(&app, "/api/workspaces/nope", Some(&alice)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_accept_invitation_flow() {
    let (app, store) = spawn_app().await;
    let alice = signup(&app, "alice@example.com", "Alice").await;
    let bob = signup(&app, "bob@example.com", "Bob").await;

    let (_, body) = create_workspace(&app, &alice, "Acme Inc", "acme", &["bob@example.com"]).await;
    let workspace_id = body["data"]["id"].as_str().unwrap().to_string();

    let invitations = store
        .list_invitations_for_workspace(&workspace_id)
        .await
        .unwrap();
    let token = invitations[0].token.clone();

    let (status, body) = post_json(
        &app,
        "/api/workspace-invitations/accept",
        Some(&bob),
        serde_json::json!({ "token": token }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], "acme");

    let invitations = store
        .list_invitations_for_workspace(&workspace_id)
        .await
        .unwrap();
    assert_eq!(invitations[0].status, "accepted");

    // Bob now sees the workspace as a member
    let (status, body) = get_json(&app, "/api/workspaces/acme", Some(&bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["members"].as_array().unwrap().len(), 2);

    // A second accept resolves nothing and must not add another membership
    let (status, _) = post_json(
        &app,
        "/api/workspace-invitations/accept",
        Some(&bob),
        serde_json::json!({ "token": token }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let members = store.list_workspace_members(&workspace_id).await.unwrap();
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn test_accept_requires_matching_email() {
    let (app, store) = spawn_app().await;
    let alice = signup(&app, "alice@example.com", "Alice").await;
    let carol = signup(&app, "carol@example.com", "Carol").await;

    let (_, body) = create_workspace(&app, &alice, "Acme Inc", "acme", &["bob@example.com"]).await;
    let workspace_id = body["data"]["id"].as_str().unwrap().to_string();

    let invitations = store
        .list_invitations_for_workspace(&workspace_id)
        .await
        .unwrap();
    let token = invitations[0].token.clone();

    // Carol holds the token but it was issued to bob
    let (status, _) = post_json(
        &app,
        "/api/workspace-invitations/accept",
        Some(&carol),
        serde_json::json!({ "token": token }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let invitations = store
        .list_invitations_for_workspace(&workspace_id)
        .await
        .unwrap();
    assert_eq!(invitations[0].status, "pending");
}

#[tokio::test]
async fn test_accept_expired_invitation() {
    let (app, store) = spawn_app().await;
    let alice = signup(&app, "alice@example.com", "Alice").await;
    let bob = signup(&app, "bob@example.com", "Bob").await;

    let (_, body) = create_workspace(&app, &alice, "Acme Inc", "acme", &["bob@example.com"]).await;
    let workspace_id = body["data"]["id"].as_str().unwrap().to_string();

    let invitation = store
        .list_invitations_for_workspace(&workspace_id)
        .await
        .unwrap()
        .remove(0);
    let token = invitation.token.clone();

    // Backdate the expiry
    let mut active: huddle::entities::workspace_invitations::ActiveModel = invitation.into();
    active.expires_at = Set((chrono::Utc::now() - chrono::Duration::days(1)).to_rfc3339());
    active.update(&store.conn).await.unwrap();

    let (status, _) = post_json(
        &app,
        "/api/workspace-invitations/accept",
        Some(&bob),
        serde_json::json!({ "token": token }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let members = store.list_workspace_members(&workspace_id).await.unwrap();
    assert_eq!(members.len(), 1);
}

#[tokio::test]
async fn test_reject_invitation() {
    let (app, store) = spawn_app().await;
    let alice = signup(&app, "alice@example.com", "Alice").await;
    let carol = signup(&app, "carol@example.com", "Carol").await;

    let (_, body) = create_workspace(&app, &alice, "Acme Inc", "acme", &["bob@example.com"]).await;
    let workspace_id = body["data"]["id"].as_str().unwrap().to_string();

    let invitations = store
        .list_invitations_for_workspace(&workspace_id)
        .await
        .unwrap();
    let token = invitations[0].token.clone();

    // Rejection does not require the invitee's email to match
    let (status, _) = post_json(
        &app,
        "/api/workspace-invitations/reject",
        Some(&carol),
        serde_json::json!({ "token": token }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let invitations = store
        .list_invitations_for_workspace(&workspace_id)
        .await
        .unwrap();
    assert_eq!(invitations[0].status, "rejected");

    // The token cannot be accepted afterwards
    let bob = signup(&app, "bob@example.com", "Bob").await;
    let (status, _) = post_json(
        &app,
        "/api/workspace-invitations/accept",
        Some(&bob),
        serde_json::json!({ "token": token }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reject_expired_invitation() {
    let (app, store) = spawn_app().await;
    let alice = signup(&app, "alice@example.com", "Alice").await;
    let bob = signup(&app, "bob@example.com", "Bob").await;

    let (_, body) = create_workspace(&app, &alice, "Acme Inc", "acme", &["bob@example.com"]).await;
    let workspace_id = body["data"]["id"].as_str().unwrap().to_string();

    let invitation = store
        .list_invitations_for_workspace(&workspace_id)
        .await
        .unwrap()
        .remove(0);
    let token = invitation.token.clone();

    let mut active: huddle::entities::workspace_invitations::ActiveModel = invitation.into();
    active.expires_at = Set((chrono::Utc::now() - chrono::Duration::days(1)).to_rfc3339());
    active.update(&store.conn).await.unwrap();

    // A stale invitation can still be declined
    let (status, _) = post_json(
        &app,
        "/api/workspace-invitations/reject",
        Some(&bob),
        serde_json::json!({ "token": token }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let invitations = store
        .list_invitations_for_workspace(&workspace_id)
        .await
        .unwrap();
    assert_eq!(invitations[0].status, "rejected");
}

#[tokio::test]
async fn test_multiple_invitations_get_unique_tokens() {
    let (app, store) = spawn_app().await;
    let alice = signup(&app, "alice@example.com", "Alice").await;

    let (status, body) = create_workspace(
        &app,
        &alice,
        "Acme Inc",
        "acme",
        &["bob@example.com", "carol@example.com", "dave@example.com"],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let workspace_id = body["data"]["id"].as_str().unwrap().to_string();

    let invitations = store
        .list_invitations_for_workspace(&workspace_id)
        .await
        .unwrap();
    assert_eq!(invitations.len(), 3);

    let tokens: std::collections::HashSet<&str> =
        invitations.iter().map(|i| i.token.as_str()).collect();
    assert_eq!(tokens.len(), 3);

    let now = chrono::Utc::now();
    for invitation in &invitations {
        assert_eq!(invitation.status, "pending");
        let expires = chrono::DateTime::parse_from_rfc3339(&invitation.expires_at)
            .unwrap()
            .with_timezone(&chrono::Utc);
        let hours = (expires - now).num_hours();
        assert!(
            (167..=168).contains(&hours),
            "expiry should be 7 days out, got {hours}h"
        );
    }
}

#[tokio::test]
async fn test_invitation_emails_dispatched() {
    let mailer = Arc::new(CapturingMailer::default());
    let (app, store) = spawn_app_with_mailer(mailer.clone()).await;
    let alice = signup(&app, "alice@example.com", "Alice").await;

    let (status, body) = create_workspace(
        &app,
        &alice,
        "Acme Inc",
        "acme",
        &["bob@example.com", "carol@example.com"],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let workspace_id = body["data"]["id"].as_str().unwrap().to_string();

    // Dispatch is detached from the request; wait for both sends to land
    let mut attempts = 0;
    loop {
        if mailer.sent.lock().unwrap().len() == 2 {
            break;
        }
        attempts += 1;
        assert!(attempts < 200, "invitation emails never dispatched");
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    let sent = mailer.sent.lock().unwrap();
    let mut recipients: Vec<&str> = sent.iter().map(|e| e.to.as_str()).collect();
    recipients.sort_unstable();
    assert_eq!(recipients, ["bob@example.com", "carol@example.com"]);
    assert!(sent.iter().all(|e| e.expiry_days == 7));
    assert!(sent.iter().all(|e| e.workspace_name == "Acme Inc"));

    // Each email carries the matching invitation's join token
    let invitations = store
        .list_invitations_for_workspace(&workspace_id)
        .await
        .unwrap();
    for invitation in &invitations {
        assert!(sent.iter().any(|e| e.join_url.ends_with(&invitation.token)));
    }
}

#[tokio::test]
async fn test_unknown_invitation_token() {
    let (app, _store) = spawn_app().await;
    let alice = signup(&app, "alice@example.com", "Alice").await;

    let (status, _) = post_json(
        &app,
        "/api/workspace-invitations/accept",
        Some(&alice),
        serde_json::json!({ "token": "definitely-not-real" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
