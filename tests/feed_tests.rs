use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use huddle::config::Config;
use huddle::db::Store;
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

async fn request_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = if let Some(body) = body {
        builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Register, log in and create a workspace; returns the bearer token.
async fn setup_workspace(app: &Router, slug: &str) -> String {
    let (status, _) = request_json(
        app,
        "POST",
        "/api/users/register",
        None,
        Some(serde_json::json!({
            "email": "alice@example.com",
            "display_name": "Alice",
            "password": "hunter2hunter2",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request_json(
        app,
        "POST",
        "/api/users/login",
        None,
        Some(serde_json::json!({ "email": "alice@example.com", "password": "hunter2hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, _) = request_json(
        app,
        "POST",
        "/api/workspaces",
        Some(&token),
        Some(serde_json::json!({ "name": "Acme Inc", "slug": slug })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    token
}

async fn create_feed(app: &Router, token: &str, slug: &str, title: &str) -> String {
    let (status, body) = request_json(
        app,
        "POST",
        &format!("/api/workspaces/{slug}/feeds"),
        Some(token),
        Some(serde_json::json!({ "title": title, "content": "Some content" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_feed_lifecycle() {
    let (app, _store) = spawn_app().await;
    let token = setup_workspace(&app, "acme").await;

    let first = create_feed(&app, &token, "acme", "First post").await;
    let second = create_feed(&app, &token, "acme", "Second post").await;
    assert_eq!(first.len(), 6);

    // Newest first
    let (status, body) =
        request_json(&app, "GET", "/api/workspaces/acme/feeds", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let feeds = body["data"].as_array().unwrap();
    assert_eq!(feeds.len(), 2);
    assert_eq!(feeds[0]["id"], second);
    assert_eq!(feeds[1]["id"], first);

    let (status, body) =
        request_json(&app, "GET", &format!("/api/feeds/{first}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "First post");
    assert_eq!(body["data"]["comments"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_comment_threading() {
    let (app, _store) = spawn_app().await;
    let token = setup_workspace(&app, "acme").await;
    let feed = create_feed(&app, &token, "acme", "Discussion").await;

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/api/feeds/{feed}/comments"),
        Some(&token),
        Some(serde_json::json!({ "content": "Top level" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let parent = body["data"]["id"].as_str().unwrap().to_string();
    assert!(body["data"]["parent_id"].is_null());

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/api/feeds/{feed}/comments"),
        Some(&token),
        Some(serde_json::json!({ "content": "A reply", "parent_id": parent })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["parent_id"], parent);

    let (status, body) =
        request_json(&app, "GET", &format!("/api/feeds/{feed}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let comments = body["data"]["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["id"], parent);
    assert_eq!(comments[1]["parent_id"], parent);
}

#[tokio::test]
async fn test_comment_validation() {
    let (app, _store) = spawn_app().await;
    let token = setup_workspace(&app, "acme").await;
    let feed = create_feed(&app, &token, "acme", "Discussion").await;
    let other = create_feed(&app, &token, "acme", "Other").await;

    // Empty content
    let (status, _) = request_json(
        &app,
        "POST",
        &format!("/api/feeds/{feed}/comments"),
        Some(&token),
        Some(serde_json::json!({ "content": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown feed
    let (status, _) = request_json(
        &app,
        "POST",
        "/api/feeds/zzzzzz/comments",
        Some(&token),
        Some(serde_json::json!({ "content": "Hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Parent on a different feed
    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/api/feeds/{other}/comments"),
        Some(&token),
        Some(serde_json::json!({ "content": "Elsewhere" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let foreign_parent = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = request_json(
        &app,
        "POST",
        &format!("/api/feeds/{feed}/comments"),
        Some(&token),
        Some(serde_json::json!({ "content": "Reply", "parent_id": foreign_parent })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown parent
    let (status, _) = request_json(
        &app,
        "POST",
        &format!("/api/feeds/{feed}/comments"),
        Some(&token),
        Some(serde_json::json!({ "content": "Reply", "parent_id": "zzzzzz" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_feed_removes_comments() {
    let (app, store) = spawn_app().await;
    let token = setup_workspace(&app, "acme").await;
    let feed = create_feed(&app, &token, "acme", "Doomed").await;

    request_json(
        &app,
        "POST",
        &format!("/api/feeds/{feed}/comments"),
        Some(&token),
        Some(serde_json::json!({ "content": "Will vanish" })),
    )
    .await;

    let (status, _) =
        request_json(&app, "DELETE", &format!("/api/feeds/{feed}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
        request_json(&app, "GET", &format!("/api/feeds/{feed}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(store.count_feed_comments(&feed).await.unwrap(), 0);

    // Deleting again reports not found
    let (status, _) =
        request_json(&app, "DELETE", &format!("/api/feeds/{feed}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_comment_removes_replies() {
    let (app, store) = spawn_app().await;
    let token = setup_workspace(&app, "acme").await;
    let feed = create_feed(&app, &token, "acme", "Discussion").await;

    let (_, body) = request_json(
        &app,
        "POST",
        &format!("/api/feeds/{feed}/comments"),
        Some(&token),
        Some(serde_json::json!({ "content": "Parent" })),
    )
    .await;
    let parent = body["data"]["id"].as_str().unwrap().to_string();

    request_json(
        &app,
        "POST",
        &format!("/api/feeds/{feed}/comments"),
        Some(&token),
        Some(serde_json::json!({ "content": "Reply", "parent_id": parent })),
    )
    .await;

    let (status, _) = request_json(
        &app,
        "DELETE",
        &format!("/api/comments/{parent}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(store.count_feed_comments(&feed).await.unwrap(), 0);
}

#[tokio::test]
async fn test_labels() {
    let (app, _store) = spawn_app().await;
    let token = setup_workspace(&app, "acme").await;

    let (status, body) = request_json(
        &app,
        "POST",
        "/api/workspaces/acme/labels",
        Some(&token),
        Some(serde_json::json!({ "label": "urgent", "color": "#ff0000" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["label"], "urgent");

    request_json(
        &app,
        "POST",
        "/api/workspaces/acme/labels",
        Some(&token),
        Some(serde_json::json!({ "label": "later", "color": "#00ff00" })),
    )
    .await;

    let (status, body) =
        request_json(&app, "GET", "/api/workspaces/acme/labels", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let labels = body["data"].as_array().unwrap();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0]["label"], "urgent");

    // Blank color is rejected
    let (status, _) = request_json(
        &app,
        "POST",
        "/api/workspaces/acme/labels",
        Some(&token),
        Some(serde_json::json!({ "label": "bad", "color": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown workspace
    let (status, _) = request_json(
        &app,
        "GET",
        "/api/workspaces/nope/labels",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_feed_requires_existing_workspace() {
    let (app, _store) = spawn_app().await;
    let token = setup_workspace(&app, "acme").await;

    let (status, _) = request_json(
        &app,
        "POST",
        "/api/workspaces/nope/feeds",
        Some(&token),
        Some(serde_json::json!({ "title": "Hello", "content": "World" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Blank title is rejected
    let (status, _) = request_json(
        &app,
        "POST",
        "/api/workspaces/acme/feeds",
        Some(&token),
        Some(serde_json::json!({ "title": " ", "content": "World" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
