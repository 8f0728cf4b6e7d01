//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle through the router, including the
//! ban gate and the cache-in-front-of-repository read paths.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use modernboard::{
    api::create_router,
    config::CacheConfig,
    models::{Ban, Post, ThreadWithOp},
    AppState, CacheRegistry, MemoryRepository,
};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

const CLIENT: [u8; 4] = [192, 168, 1, 20];

fn create_test_app() -> (Arc<MemoryRepository>, AppState, Router) {
    let repo = Arc::new(MemoryRepository::new());
    let cache = CacheRegistry::build(repo.clone(), &CacheConfig::default());
    let state = AppState::new(Arc::new(cache), repo.clone());
    let app = create_router(state.clone());
    (repo, state, app)
}

fn client() -> ConnectInfo<SocketAddr> {
    ConnectInfo(SocketAddr::from((CLIENT, 51234)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .extension(client())
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .extension(client())
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn thread(id: i64, subject: &str) -> ThreadWithOp {
    ThreadWithOp {
        id,
        post_id: id * 10,
        subject: subject.to_string(),
        is_locked: false,
        is_sticky: false,
        author: "anon".to_string(),
        tripcode: String::new(),
        body_html: "<p>first</p>".to_string(),
        thumbnail_name: format!("{id}s.jpg"),
        file_name: format!("{id}.jpg"),
        created: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        posts_count: 1,
        images_count: 1,
    }
}

fn op_post(thread: &ThreadWithOp) -> Post {
    Post {
        id: thread.post_id,
        author: thread.author.clone(),
        tripcode: thread.tripcode.clone(),
        body_html: thread.body_html.clone(),
        thumbnail_name: thread.thumbnail_name.clone(),
        file_name: thread.file_name.clone(),
        file_original_name: "cat.jpg".to_string(),
        created: thread.created,
        replies: Vec::new(),
    }
}

// == Board Endpoint Tests ==

#[tokio::test]
async fn test_board_list_served_from_cache() {
    let (repo, _, app) = create_test_app();

    let first = app.clone().oneshot(get("/boards")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let second = app.oneshot(get("/boards")).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);

    assert_eq!(repo.read_count(), 1);
    assert_eq!(body_to_json(second.into_body()).await, serde_json::json!([]));
}

#[tokio::test]
async fn test_create_board_invalidates_board_list() {
    let (_, _, app) = create_test_app();

    // prime the cache with the empty list
    app.clone().oneshot(get("/boards")).await.unwrap();

    let response = app
        .clone()
        .oneshot(post_json("/boards", r#"{"title":"Technology","uri":"g"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["board"]["uri"], "g");

    let response = app.oneshot(get("/boards")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["title"], "Technology");
}

#[tokio::test]
async fn test_create_board_validation() {
    let (_, _, app) = create_test_app();

    let response = app
        .oneshot(post_json("/boards", r#"{"title":"","uri":"g"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("title"));
}

// == Thread Endpoint Tests ==

#[tokio::test]
async fn test_threads_page_requires_valid_page() {
    let (_, _, app) = create_test_app();

    for uri in ["/boards/g/threads", "/boards/g/threads?page=0", "/boards/g/threads?page=x"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn test_threads_page_rejects_invalid_board_uri() {
    let (repo, state, app) = create_test_app();
    let long_uri = format!("/boards/{}/threads?page=1", "a".repeat(64));

    for uri in [long_uri.as_str(), "/boards/a_1/threads?page=1"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }

    assert_eq!(state.cache.threads_page.stats().total_entries, 0);
    assert_eq!(repo.read_count(), 0);
}

#[tokio::test]
async fn test_threads_page_cached_per_board_and_page() {
    let (repo, _, app) = create_test_app();
    let summary = thread(1, "hello");
    repo.insert_thread("g", summary.clone(), vec![op_post(&summary)])
        .await;

    let response = app
        .clone()
        .oneshot(get("/boards/g/threads?page=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json[0]["subject"], "hello");

    app.clone()
        .oneshot(get("/boards/g/threads?page=1"))
        .await
        .unwrap();
    assert_eq!(repo.read_count(), 1);

    // another page is a separate entry
    let response = app.oneshot(get("/boards/g/threads?page=2")).await.unwrap();
    assert_eq!(body_to_json(response.into_body()).await, serde_json::json!([]));
    assert_eq!(repo.read_count(), 2);
}

#[tokio::test]
async fn test_single_thread_and_not_found() {
    let (repo, _, app) = create_test_app();
    let summary = thread(7, "question");
    repo.insert_thread("g", summary.clone(), vec![op_post(&summary)])
        .await;

    let response = app.clone().oneshot(get("/threads/7")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["subject"], "question");
    assert_eq!(json["posts"].as_array().unwrap().len(), 1);

    let response = app.oneshot(get("/threads/8")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trending() {
    let (repo, _, app) = create_test_app();
    let summary = thread(3, "hot");
    repo.insert_thread("b", summary.clone(), vec![op_post(&summary)])
        .await;

    let response = app.oneshot(get("/home/trending")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json[0]["board_uri"], "b");
}

#[tokio::test]
async fn test_repository_outage_returns_503() {
    let (repo, _, app) = create_test_app();
    repo.set_available(false);

    let response = app.oneshot(get("/home/trending")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// == Ban Gate Tests ==

#[tokio::test]
async fn test_banned_client_can_read_but_not_write() {
    let (_, state, app) = create_test_app();
    state.cache.bans.insert_ban("192.168.1.20", "spam");

    let response = app
        .clone()
        .oneshot(post_json("/boards", r#"{"title":"Technology","uri":"g"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("spam"));

    let response = app.oneshot(get("/boards")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ban_endpoint_blocks_next_write() {
    let (_, _, app) = create_test_app();

    let response = app
        .clone()
        .oneshot(post_json("/bans/ip", r#"{"ip":"192.168.1.20","reason":"flood"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["ip"], "192.168.1.20");

    let response = app
        .oneshot(post_json("/boards", r#"{"title":"Technology","uri":"g"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_started_registry_loads_bans_before_serving() {
    let repo = Arc::new(MemoryRepository::new());
    repo.replace_bans(vec![Ban {
        ip: "192.168.1.20".to_string(),
        reason: "spam".to_string(),
    }])
    .await;
    let config = modernboard::Config::default();
    let state = AppState::start(repo, &config).await;
    let app = create_router(state.clone());

    let response = app
        .oneshot(post_json("/boards", r#"{"title":"Technology","uri":"g"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    state.cache.shutdown().await;
}

#[tokio::test]
async fn test_ipv6_ban_matches_peer_address() {
    let (_, _, app) = create_test_app();

    let response = app
        .clone()
        .oneshot(post_json("/bans/ip", r#"{"ip":"2001:DB8:0::1","reason":"flood"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/boards")
                .header("content-type", "application/json")
                .extension(ConnectInfo(SocketAddr::from((
                    "2001:db8::1".parse::<std::net::IpAddr>().unwrap(),
                    51234,
                ))))
                .body(Body::from(r#"{"title":"Technology","uri":"g"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_ban_rejects_invalid_address() {
    let (_, state, app) = create_test_app();

    let response = app
        .oneshot(post_json("/bans/ip", r#"{"ip":"1.2.3","reason":"flood"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.cache.bans.is_empty());
}

// == Stats and Health Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let (_, _, app) = create_test_app();
    app.clone().oneshot(get("/boards")).await.unwrap();
    app.clone().oneshot(get("/boards")).await.unwrap();

    let response = app.oneshot(get("/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["caches"]["boards"]["hits"], 1);
    assert_eq!(json["caches"]["boards"]["misses"], 1);
    assert_eq!(json["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_, _, app) = create_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
}
