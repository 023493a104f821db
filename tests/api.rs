mod support;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use postdesk_api_types::{ApiErrorBody, PostView, codes};

use support::{ALICE, BOB, MemoryStore, app, json, send};

#[tokio::test]
async fn create_returns_the_new_post() {
    let app = app(MemoryStore::default());

    let (status, _, body) = send(
        &app.router,
        json(
            Method::POST,
            "/api/v1/posts",
            Some(ALICE),
            r#"{"title":"  Launch notes ","published":true}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let post: PostView = serde_json::from_str(&body).unwrap();
    assert_eq!(post.title, "Launch notes");
    assert_eq!(post.content, "");
    assert!(post.published);
    assert_eq!(post.user_id, "alice");
}

#[tokio::test]
async fn create_without_session_is_unauthorized() {
    let app = app(MemoryStore::default());

    let (status, _, body) = send(
        &app.router,
        json(Method::POST, "/api/v1/posts", None, r#"{"title":"x"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let error: ApiErrorBody = serde_json::from_str(&body).unwrap();
    assert_eq!(error.error.code, codes::UNAUTHORIZED);
    assert_eq!(app.store.writes(), 0);
}

#[tokio::test]
async fn create_names_every_invalid_field() {
    let app = app(MemoryStore::default());
    let long_content = "c".repeat(50_001);

    let (status, _, body) = send(
        &app.router,
        json(
            Method::POST,
            "/api/v1/posts",
            Some(ALICE),
            &serde_json::json!({ "title": "", "content": long_content }).to_string(),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ApiErrorBody = serde_json::from_str(&body).unwrap();
    assert_eq!(error.error.code, codes::VALIDATION);
    let hint = error.error.hint.unwrap();
    assert!(hint.contains("title"));
    assert!(hint.contains("content"));
    assert_eq!(app.store.writes(), 0);
}

#[tokio::test]
async fn create_rejects_nul_characters() {
    let app = app(MemoryStore::default());

    let (status, _, body) = send(
        &app.router,
        json(
            Method::POST,
            "/api/v1/posts",
            Some(ALICE),
            &serde_json::json!({ "title": "bad\u{0}title" }).to_string(),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ApiErrorBody = serde_json::from_str(&body).unwrap();
    assert_eq!(error.error.code, codes::VALIDATION);
    assert!(error.error.hint.unwrap().contains("title"));
    assert_eq!(app.store.writes(), 0);
}

#[tokio::test]
async fn concurrent_creates_do_not_block_each_other() {
    let app = app(MemoryStore::gated());
    let spawn_create = |title: &'static str| {
        let router = app.router.clone();
        tokio::spawn(async move {
            send(
                &router,
                json(
                    Method::POST,
                    "/api/v1/posts",
                    Some(ALICE),
                    &serde_json::json!({ "title": title }).to_string(),
                ),
            )
            .await
        })
    };

    let first = spawn_create("First");
    app.store.entered.notified().await;
    let second = spawn_create("Second");
    tokio::time::timeout(Duration::from_secs(5), app.store.entered.notified())
        .await
        .expect("second create reached the store");

    app.store.release.notify_waiters();
    let (first_status, _, _) = first.await.unwrap();
    let (second_status, _, _) = second.await.unwrap();
    assert_eq!(first_status, StatusCode::CREATED);
    assert_eq!(second_status, StatusCode::CREATED);
    assert_eq!(app.store.writes(), 2);
    assert_eq!(app.store.len(), 2);
}

#[tokio::test]
async fn publish_requires_the_flag() {
    let app = app(MemoryStore::default());
    app.store.seed("p1", "alice", false);

    let (status, _, body) = send(
        &app.router,
        json(
            Method::POST,
            "/api/v1/posts/p1/publish",
            Some(ALICE),
            r#"{"title":"ignored"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ApiErrorBody = serde_json::from_str(&body).unwrap();
    assert!(error.error.hint.unwrap().contains("published"));
    assert_eq!(app.store.writes(), 0);
}

#[tokio::test]
async fn publish_returns_updated_post() {
    let app = app(MemoryStore::default());
    app.store.seed("p1", "alice", false);

    let (status, _, body) = send(
        &app.router,
        json(
            Method::POST,
            "/api/v1/posts/p1/publish",
            Some(ALICE),
            r#"{"published":true}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let post: PostView = serde_json::from_str(&body).unwrap();
    assert_eq!(post.id, "p1");
    assert!(post.published);
}

#[tokio::test]
async fn foreign_posts_read_as_missing() {
    let app = app(MemoryStore::default());
    app.store.seed("p1", "alice", false);

    let (status, _, body) = send(
        &app.router,
        json(
            Method::POST,
            "/api/v1/posts/p1/publish",
            Some(BOB),
            r#"{"published":true}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: ApiErrorBody = serde_json::from_str(&body).unwrap();
    assert_eq!(error.error.code, codes::NOT_FOUND);

    let (status, _, _) = send(
        &app.router,
        json(Method::DELETE, "/api/v1/posts/p1", Some(BOB), ""),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.store.row("p1").is_some());
}

#[tokio::test]
async fn delete_returns_the_removed_post() {
    let app = app(MemoryStore::default());
    app.store.seed("p1", "alice", true);

    let (status, _, body) = send(
        &app.router,
        json(Method::DELETE, "/api/v1/posts/p1", Some(ALICE), ""),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let post: PostView = serde_json::from_str(&body).unwrap();
    assert_eq!(post.id, "p1");
    assert!(app.store.row("p1").is_none());
}

#[tokio::test]
async fn overlapping_delete_is_a_conflict() {
    let app = app(MemoryStore::gated());
    app.store.seed("p1", "alice", false);

    let router = app.router.clone();
    let first = tokio::spawn(async move {
        send(
            &router,
            json(Method::DELETE, "/api/v1/posts/p1", Some(ALICE), ""),
        )
        .await
    });
    app.store.entered.notified().await;

    let (status, _, body) = send(
        &app.router,
        json(Method::DELETE, "/api/v1/posts/p1", Some(ALICE), ""),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let error: ApiErrorBody = serde_json::from_str(&body).unwrap();
    assert_eq!(error.error.code, codes::CONFLICT);

    app.store.release.notify_one();
    let (status, _, _) = first.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.writes(), 1);
}
