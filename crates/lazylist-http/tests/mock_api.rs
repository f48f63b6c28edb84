//! Mock API tests for the HTTP collaborators.
//!
//! These tests use wiremock to simulate the backend and drive the engine
//! through the real HTTP data source and signer.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use lazylist::{FailureReason, FetchOutcome, ListConfig, ListScreen, PaginatedListCache};
use lazylist_core::{
    Cursor, DataSource, EventSource, FetchParams, ItemSchema, ListEvent, MediaKey, ObjectSigner,
    SearchQuery, SearchSource, SourceUrl,
};
use lazylist_http::{HttpClient, HttpDataSource, HttpObjectSigner, WsEventSource};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a base URL from a mock server.
fn mock_base(server: &MockServer) -> SourceUrl {
    SourceUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

fn source(server: &MockServer) -> HttpDataSource {
    HttpDataSource::new(
        HttpClient::new(mock_base(server)).unwrap(),
        ItemSchema::with_id_field("post_id").media_field("fileKey"),
    )
}

fn posts(range: std::ops::Range<usize>) -> Vec<serde_json::Value> {
    range
        .map(|i| json!({"post_id": format!("p{i}"), "author": format!("Author {i}")}))
        .collect()
}

// ============================================================================
// Paging
// ============================================================================

#[tokio::test]
async fn test_first_page_then_last_page() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/getAllPosts"))
        .and(body_json(json!({"command": "getAllPosts", "limit": 20})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": posts(0..20),
            "lastEvaluatedKey": "abc",
            "count": 20
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/getAllPosts"))
        .and(body_partial_json(json!({"lastEvaluatedKey": "abc"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": [],
            "count": 0
        })))
        .mount(&server)
        .await;

    let config = ListConfig::for_commands("getAllPosts", "searchPosts");
    let cache = PaginatedListCache::new(source(&server), &config).unwrap();

    let first = cache.fetch_next().await.unwrap();
    assert!(matches!(first, FetchOutcome::Fetched { added: 20, .. }));
    assert!(cache.has_more());
    assert_eq!(cache.cursor(), Some(Cursor::token("abc")));

    let second = cache.fetch_next().await.unwrap();
    assert!(matches!(second, FetchOutcome::Fetched { added: 0, .. }));
    assert!(!cache.has_more());
    assert_eq!(cache.cursor(), None);
    assert_eq!(cache.len(), 20);
}

#[tokio::test]
async fn test_structured_cursor_round_trips() {
    let server = MockServer::start().await;
    let key = json!({"post_id": "p1", "created_at": 1717000000});

    Mock::given(method("POST"))
        .and(path("/getAllPosts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": posts(0..2),
            "lastEvaluatedKey": key
        })))
        .mount(&server)
        .await;

    let page = source(&server)
        .fetch(
            "getAllPosts",
            FetchParams {
                limit: 2,
                cursor: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(page.cursor.unwrap().as_value(), &key);
    assert_eq!(page.items[1].display_name.as_deref(), Some("Author 1"));
}

#[tokio::test]
async fn test_server_error_leaves_cache_untouched() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/list"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "InternalError",
            "message": "database unavailable"
        })))
        .mount(&server)
        .await;

    let cache = PaginatedListCache::new(source(&server), &ListConfig::default()).unwrap();
    let err = cache.fetch_next().await.unwrap_err();

    assert_eq!(err.reason, FailureReason::Server);
    assert!(err.to_string().contains("database unavailable"));
    assert!(cache.has_more());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_malformed_payload_is_server_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": "nope"})))
        .mount(&server)
        .await;

    let cache = PaginatedListCache::new(source(&server), &ListConfig::default()).unwrap();
    let err = cache.fetch_next().await.unwrap_err();

    assert_eq!(err.reason, FailureReason::Server);
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": posts(0..1)}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = ListConfig {
        request_timeout_ms: 100,
        ..ListConfig::default()
    };
    let cache = PaginatedListCache::new(source(&server), &config).unwrap();
    let err = cache.fetch_next().await.unwrap_err();

    assert_eq!(err.reason, FailureReason::Timeout);
    assert!(!cache.is_loading());
}

#[tokio::test]
async fn test_unreachable_server_is_network_failure() {
    let base = SourceUrl::new("http://127.0.0.1:9").unwrap();
    let source = HttpDataSource::new(HttpClient::new(base).unwrap(), ItemSchema::default());
    let cache = PaginatedListCache::new(source, &ListConfig::default()).unwrap();

    let err = cache.fetch_next().await.unwrap_err();
    assert_eq!(err.reason, FailureReason::Network);
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_sends_text_and_filters() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/searchPosts"))
        .and(body_json(json!({
            "command": "searchPosts",
            "searchQuery": "cardio",
            "category": "events"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"response": posts(3..5), "lastEvaluatedKey": "ignored"}
        })))
        .mount(&server)
        .await;

    let query = SearchQuery::text("cardio").with_filter("category", json!("events"));
    let items = source(&server).search("searchPosts", &query).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id.as_str(), "p3");
}

// ============================================================================
// Signing
// ============================================================================

#[tokio::test]
async fn test_sign_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/getObjectSignedUrl"))
        .and(header("authorization", "Bearer t0k3n"))
        .and(body_json(json!({
            "command": "getObjectSignedUrl",
            "key": "uploads/p1.jpg"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://bucket.example.com/uploads/p1.jpg?X-Amz-Signature=abc"
        })))
        .mount(&server)
        .await;

    let client = HttpClient::with_token(mock_base(&server), "t0k3n").unwrap();
    let url = HttpObjectSigner::new(client)
        .sign(&MediaKey::new("uploads/p1.jpg").unwrap())
        .await
        .unwrap();

    assert!(url.ends_with("X-Amz-Signature=abc"));
}

#[tokio::test]
async fn test_screen_resolves_visible_media_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": [
                {"post_id": "p1", "author": "Meera Iyer", "fileKey": "uploads/p1.jpg"},
                {"post_id": "p2", "author": "Arjun Das", "fileKey": "uploads/missing.jpg"},
                {"post_id": "p3", "author": "Kiran Rao"}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/getObjectSignedUrl"))
        .and(body_partial_json(json!({"key": "uploads/p1.jpg"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": "https://cdn.test/p1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/getObjectSignedUrl"))
        .and(body_partial_json(json!({"key": "uploads/missing.jpg"})))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "NoSuchKey"})))
        .mount(&server)
        .await;

    let client = HttpClient::new(mock_base(&server)).unwrap();
    let screen = ListScreen::new(
        source(&server),
        source(&server),
        HttpObjectSigner::new(client),
        &ListConfig::default(),
    )
    .unwrap();
    screen.load_more().await.unwrap();

    let ids: Vec<_> = screen.rows().iter().map(|r| r.item.id.clone()).collect();
    screen.on_viewable_items_changed(&ids).await;
    screen.on_viewable_items_changed(&ids).await;

    let rows = screen.rows();
    assert_eq!(
        rows[0].media.as_ref().and_then(|m| m.url()),
        Some("https://cdn.test/p1")
    );
    assert!(rows[1].media.as_ref().unwrap().is_placeholder());
    assert!(rows[2].media.as_ref().unwrap().is_placeholder());
}

// ============================================================================
// Realtime
// ============================================================================

#[tokio::test]
async fn test_websocket_frames_become_events() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        use tokio_tungstenite::tungstenite::Message;
        for frame in [
            r#"{"type": "created", "payload": {"post_id": "p9", "author": "New"}}"#,
            "garbage",
            r#"{"type": "deleted", "payload": {"post_id": "p1"}}"#,
        ] {
            ws.send(Message::text(frame)).await.unwrap();
        }
        ws.close(None).await.unwrap();
    });

    let base = SourceUrl::new(format!("http://127.0.0.1:{port}")).unwrap();
    let events = WsEventSource::new(&base, "events", ItemSchema::with_id_field("post_id"));
    assert_eq!(events.url(), format!("ws://127.0.0.1:{port}/events"));

    let received: Vec<_> = events
        .subscribe()
        .unwrap()
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .map(|e| e.unwrap())
        .collect();

    assert_eq!(received.len(), 2);
    assert!(matches!(&received[0], ListEvent::Created(item) if item.id.as_str() == "p9"));
    assert!(matches!(&received[1], ListEvent::Deleted(id) if id.as_str() == "p1"));
}
