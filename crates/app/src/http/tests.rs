use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::http::router;
use crate::state::AppState;
use threadboard_core::store::MemoryBoardRepository;
use threadboard_core::BoardService;
use threadboard_infra::auth::JwtAuthority;
use threadboard_infra::BoardBackend;

const SECRET: &str = "test-secret";

struct TestApp {
    router: Router,
    authority: JwtAuthority,
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl TestApp {
    fn new() -> Self {
        Self::with_auth(Some(SECRET))
    }

    fn with_auth(secret: Option<&str>) -> Self {
        let config = AppConfig {
            http_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: None,
            db_max_connections: 1,
            jwt_secret: secret.map(str::to_string),
            cors_allow_origins: Vec::new(),
        };
        let auth = secret.map(|value| Arc::new(JwtAuthority::new(value).unwrap()));
        let state = AppState {
            config: Arc::new(config),
            board: Arc::new(BoardService::new(BoardBackend::Memory(
                MemoryBoardRepository::new(),
            ))),
            auth,
            db: None,
        };
        Self {
            router: router::build(state),
            authority: JwtAuthority::new(SECRET).unwrap(),
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            let token = self.authority.issue(user, 300).unwrap();
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    async fn send_raw(
        &self,
        uri: &str,
        user: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> TestResponse {
        let token = self.authority.issue(user, 300).unwrap();
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {token}"));
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        self.dispatch(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    async fn create_post(&self, user: &str) -> i64 {
        let res = self
            .send(
                Method::POST,
                "/api/boards",
                Some(user),
                Some(json!({"title": "T", "content": "C"})),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        res.body["id"].as_i64().unwrap()
    }

    async fn add_comment(&self, post_id: i64, user: &str, content: &str) -> i64 {
        let res = self
            .send(
                Method::POST,
                &format!("/api/boards/{post_id}/comments"),
                Some(user),
                Some(json!({ "content": content })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        res.body["id"].as_i64().unwrap()
    }

    async fn add_reply(&self, post_id: i64, parent_id: i64, user: &str, content: &str) -> i64 {
        let res = self
            .send(
                Method::POST,
                &format!("/api/boards/{post_id}/comments/{parent_id}/replies"),
                Some(user),
                Some(json!({ "content": content })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        res.body["id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn create_post_returns_location_and_author() {
    let app = TestApp::new();
    let res = app
        .send(
            Method::POST,
            "/api/boards",
            Some("alice"),
            Some(json!({"title": "T", "content": "C"})),
        )
        .await;

    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.body["id"].as_i64().unwrap();
    assert_eq!(res.headers[LOCATION], format!("/api/boards/{id}").as_str());
    assert_eq!(res.body["author"], "alice");
    assert!(res.body["createdAt"].is_string());

    let res = app
        .send(Method::GET, &format!("/api/boards/{id}"), None, None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["title"], "T");
    assert_eq!(res.body["content"], "C");
}

#[tokio::test]
async fn create_post_with_missing_field_is_bad_request() {
    let app = TestApp::new();
    let res = app
        .send(
            Method::POST,
            "/api/boards",
            Some("alice"),
            Some(json!({"title": "T"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "title and content are required");
}

#[tokio::test]
async fn mutations_require_a_valid_token() {
    let app = TestApp::new();
    let res = app
        .send(
            Method::POST,
            "/api/boards",
            None,
            Some(json!({"title": "T", "content": "C"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/boards")
        .header(AUTHORIZATION, "Bearer not-a-jwt")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"title": "T", "content": "C"}).to_string()))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mutations_are_unavailable_without_auth_config() {
    let app = TestApp::with_auth(None);
    let res = app
        .send(
            Method::POST,
            "/api/boards",
            Some("alice"),
            Some(json!({"title": "T", "content": "C"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);

    let res = app.send(Method::GET, "/api/boards", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!([]));
}

#[tokio::test]
async fn missing_post_is_not_found() {
    let app = TestApp::new();
    let res = app.send(Method::GET, "/api/boards/404", None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    let res = app
        .send(Method::GET, "/api/boards/404/comments", None, None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_id_is_rejected() {
    let app = TestApp::new();
    let res = app.send(Method::GET, "/api/boards/abc", None, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["message"].is_string());

    let post = app.create_post("alice").await;
    let res = app
        .send(
            Method::DELETE,
            &format!("/api/boards/{post}/comments/x1"),
            Some("alice"),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["message"].is_string());
}

#[tokio::test]
async fn unreadable_post_body_is_a_json_bad_request() {
    let app = TestApp::new();
    let cases = [
        (None, r#"{"title":"T","content":"C"}"#),
        (Some("application/json"), r#"{"title":5,"content":"C"}"#),
        (Some("application/json"), "{not json"),
    ];
    for (content_type, body) in cases {
        let res = app.send_raw("/api/boards", "alice", content_type, body).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "body {body}");
        assert!(res.body["message"].is_string(), "body {body}");
    }

    let res = app.send(Method::GET, "/api/boards", None, None).await;
    assert_eq!(res.body, json!([]));
}

#[tokio::test]
async fn unreadable_comment_body_is_a_json_bad_request() {
    let app = TestApp::new();
    let post = app.create_post("alice").await;
    let uri = format!("/api/boards/{post}/comments");
    let res = app
        .send_raw(&uri, "bob", Some("application/json"), r#"{"content":[1]}"#)
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["message"].is_string());

    let res = app.send_raw(&uri, "bob", Some("text/plain"), "hello").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "request body must be application/json");
}

#[tokio::test]
async fn auth_rejection_uses_message_body() {
    let app = TestApp::new();
    let res = app
        .send(
            Method::POST,
            "/api/boards",
            None,
            Some(json!({"title": "T", "content": "C"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "login required");
}

#[tokio::test]
async fn only_author_may_update_post() {
    let app = TestApp::new();
    let id = app.create_post("alice").await;
    let uri = format!("/api/boards/{id}");

    let res = app
        .send(Method::PUT, &uri, Some("bob"), Some(json!({"title": "hijack"})))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .send(
            Method::PUT,
            &uri,
            Some("alice"),
            Some(json!({"title": "T2", "content": ""})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["title"], "T2");
    assert_eq!(res.body["content"], "C");
}

#[tokio::test]
async fn delete_post_cascades_and_returns_no_content() {
    let app = TestApp::new();
    let id = app.create_post("alice").await;
    let c1 = app.add_comment(id, "bob", "c1").await;
    app.add_reply(id, c1, "alice", "r1").await;

    let uri = format!("/api/boards/{id}");
    let res = app.send(Method::DELETE, &uri, Some("bob"), None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.send(Method::DELETE, &uri, Some("alice"), None).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(res.body, Value::Null);

    let res = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reply_thread_scenario() {
    let app = TestApp::new();
    let post = app.create_post("alice").await;
    let c1 = app.add_comment(post, "alice", "c1").await;
    let r1 = app.add_reply(post, c1, "bob", "r1").await;
    let r2 = app.add_reply(post, r1, "alice", "r2").await;

    let res = app
        .send(
            Method::GET,
            &format!("/api/boards/{post}/comments/{c1}/replies"),
            None,
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body[0]["id"], r1);
    assert_eq!(res.body[0]["parentId"], c1);

    let res = app
        .send(
            Method::DELETE,
            &format!("/api/boards/{post}/comments/{c1}"),
            Some("alice"),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app
        .send(Method::GET, &format!("/api/boards/{post}/comments"), None, None)
        .await;
    assert_eq!(res.body, json!([]));
    for id in [r1, r2] {
        let res = app
            .send(
                Method::GET,
                &format!("/api/boards/{post}/comments/{id}/replies"),
                None,
                None,
            )
            .await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn reply_location_points_under_parent() {
    let app = TestApp::new();
    let post = app.create_post("alice").await;
    let c1 = app.add_comment(post, "alice", "c1").await;
    let res = app
        .send(
            Method::POST,
            &format!("/api/boards/{post}/comments/{c1}/replies"),
            Some("bob"),
            Some(json!({"content": "r"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.body["id"].as_i64().unwrap();
    assert_eq!(
        res.headers[LOCATION],
        format!("/api/boards/{post}/comments/{c1}/replies/{id}").as_str()
    );
}

#[tokio::test]
async fn comment_of_other_post_is_a_bad_request() {
    let app = TestApp::new();
    let p = app.create_post("alice").await;
    let q = app.create_post("alice").await;
    let c = app.add_comment(q, "alice", "on q").await;

    let res = app
        .send(
            Method::GET,
            &format!("/api/boards/{p}/comments/{c}/replies"),
            None,
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .send(
            Method::DELETE,
            &format!("/api/boards/{p}/comments/{c}"),
            Some("alice"),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .send(
            Method::DELETE,
            &format!("/api/boards/{q}/comments/{c}"),
            Some("bob"),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn blank_comment_is_a_bad_request() {
    let app = TestApp::new();
    let post = app.create_post("alice").await;
    let res = app
        .send(
            Method::POST,
            &format!("/api/boards/{post}/comments"),
            Some("bob"),
            Some(json!({"content": "   "})),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "content is required");
}

#[tokio::test]
async fn health_reports_backend_and_auth() {
    let app = TestApp::new();
    let res = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ok");
    assert_eq!(res.body["storage"]["backend"], "memory");
    assert_eq!(res.body["auth"]["configured"], true);
}
