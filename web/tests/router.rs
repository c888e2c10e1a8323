use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use image::{ImageFormat, Rgba, RgbaImage};
use serde_json::json;
use std::io::Cursor;
use std::path::Path;
use threadcard_core::{AppConfig, CardConfig, ThreadsConfig};
use tower::ServiceExt;
use web::{router, AppState};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PAGE: &str = r#"<script>["LSD",[],{"token":"tok-123"},332]</script>"#;

fn png_bytes(color: [u8; 4]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    RgbaImage::from_pixel(8, 8, Rgba(color))
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn test_app(server: &MockServer, dir: &Path) -> Router {
    let background_path = dir.join("background.png");
    RgbaImage::from_pixel(20, 20, Rgba([30, 30, 30, 255]))
        .save(&background_path)
        .unwrap();

    let config = AppConfig {
        threads: ThreadsConfig {
            web_base_url: server.uri(),
            token_url: format!("{}/instagram", server.uri()),
            profile_doc_id: "111".to_string(),
            threads_doc_id: "222".to_string(),
            likers_doc_id: "333".to_string(),
            ..ThreadsConfig::default()
        },
        card: CardConfig {
            background_path,
            font_path: dir.join("no-font.ttf"),
            output_dir: dir.join("static"),
        },
        ..AppConfig::default()
    };

    router(AppState::new(config).unwrap())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

fn lookup_request(username: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={}", username)))
        .unwrap()
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_graphql(server: &MockServer, needle: &str, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/graphql"))
        .and(body_string_contains(needle))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_known_user(server: &MockServer, threads: serde_json::Value) {
    mount_page(server, "/instagram", TOKEN_PAGE).await;
    mount_page(server, "/@alice", r#"{"props":{"user_id":"42"}}"#).await;
    mount_graphql(
        server,
        "doc_id=111",
        json!({
            "data": {
                "userData": {
                    "user": {
                        "pk": "42",
                        "username": "alice",
                        "follower_count": 1500,
                        "profile_pic_url": format!("{}/avatars/alice.png", server.uri())
                    }
                }
            }
        }),
    )
    .await;
    mount_graphql(
        server,
        "doc_id=222",
        json!({ "data": { "mediaData": { "threads": threads } } }),
    )
    .await;
}

#[tokio::test]
async fn test_index_and_health() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&server, dir.path());

    let (status, body) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<form method=\"post\" action=\"/\">"));
    assert!(body.contains("name=\"username\""));

    let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_full_lookup_renders_card() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&server, dir.path());

    mount_known_user(
        &server,
        json!([
            { "thread_items": [{ "post": { "code": "AAA", "like_count": 3 } }] },
            { "thread_items": [{ "post": { "code": "BBB", "like_count": 2 } }] }
        ]),
    )
    .await;
    mount_page(&server, "/t/AAA", r#"{"post_id":"100"}"#).await;
    mount_page(&server, "/t/BBB", r#"{"post_id":"200"}"#).await;
    mount_graphql(
        &server,
        "%22100%22",
        json!({ "data": { "likers": { "users": [
            { "username": "alice" },
            { "username": "bob", "profile_pic_url": format!("{}/avatars/bob.png", server.uri()) },
            { "username": "carol", "profile_pic_url": format!("{}/avatars/missing.png", server.uri()) }
        ] } } }),
    )
    .await;
    mount_graphql(
        &server,
        "%22200%22",
        json!({ "data": { "likers": { "users": [
            { "username": "carol", "profile_pic_url": format!("{}/avatars/missing.png", server.uri()) }
        ] } } }),
    )
    .await;
    for avatar in ["/avatars/alice.png", "/avatars/bob.png"] {
        Mock::given(method("GET"))
            .and(path(avatar))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes([200, 0, 0, 255])))
            .mount(&server)
            .await;
    }

    let (status, body) = send(&app, lookup_request("alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Followers: 1,500"));
    assert!(body.contains("src=\"/static/alice_result_image.png\""));

    let carol = body.find("carol <span").unwrap();
    let bob = body.find("bob <span").unwrap();
    assert!(carol < bob, "carol liked twice and ranks first");
    assert!(!body.contains("alice <span"));

    assert!(dir.path().join("static/alice_result_image.png").exists());

    let response = app
        .clone()
        .oneshot(
            Request::get("/static/alice_result_image.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
}

#[tokio::test]
async fn test_user_without_threads_gets_partial_page() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&server, dir.path());
    mount_known_user(&server, json!([])).await;

    let (status, body) = send(&app, lookup_request("alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Followers: 1,500"));
    assert!(body.contains("This user has no threads yet."));
    assert!(!body.contains("_result_image.png"));
    assert!(!dir.path().join("static/alice_result_image.png").exists());
}

#[tokio::test]
async fn test_unknown_user_gets_partial_page() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&server, dir.path());
    Mock::given(method("GET"))
        .and(path("/@ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (status, body) = send(&app, lookup_request("ghost")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No Threads profile found for ghost."));
}

#[tokio::test]
async fn test_invalid_username_rerenders_form() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&server, dir.path());

    let (status, body) = send(&app, lookup_request("..%2Fetc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("class=\"error\""));
    assert!(body.contains("value=\"../etc\""));

    let (status, _) = send(&app, lookup_request("")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upstream_failure_rerenders_form() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&server, dir.path());
    mount_page(&server, "/@alice", r#"{"props":{"user_id":"42"}}"#).await;
    Mock::given(method("GET"))
        .and(path("/instagram"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (status, body) = send(&app, lookup_request("alice")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("class=\"error\""));
    assert!(body.contains("value=\"alice\""));
}
