use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use posts_api::{
    AppState, Config, app,
    models::{NewPost, Post},
    store::{MemoryPostStore, PostFilter, PostStore, StoreError},
};
use serde_json::{Value, json};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::Notify;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Arc<dyn PostStore>,
}

/// Store whose `find` parks until released. Other calls never return.
#[derive(Default)]
struct ParkedStore {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl PostStore for ParkedStore {
    async fn find_by_id(&self, _id: ObjectId) -> Result<Option<Post>, StoreError> {
        std::future::pending().await
    }

    async fn find(&self, _filter: PostFilter) -> Result<Vec<Post>, StoreError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(Vec::new())
    }

    async fn insert_one(&self, _post: NewPost) -> Result<ObjectId, StoreError> {
        std::future::pending().await
    }
}

fn router_with(store: Arc<dyn PostStore>, vars: &[(&str, &str)]) -> Router {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    app(AppState { posts: store }, &config)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

impl TestApp {
    fn new() -> Self {
        let state = AppState::new(MemoryPostStore::new());
        let config = Config::from_lookup(|_| None).unwrap();
        Self {
            store: state.posts.clone(),
            router: app(state, &config),
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_json(&self, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::post("/posts")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn create(&self, owner_id: &str, message: &str) -> String {
        let (status, body) = self
            .post_json(json!({ "owner_id": owner_id, "message": message }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn stored_count(&self) -> usize {
        self.store.find(PostFilter::all()).await.unwrap().len()
    }
}

fn messages(body: &Value) -> Vec<String> {
    let mut messages: Vec<String> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["message"].as_str().unwrap().to_string())
        .collect();
    messages.sort();
    messages
}

#[tokio::test]
async fn create_then_get_returns_the_same_post() {
    let app = TestApp::new();

    let (status, body) = app.post_json(json!({ "message": "hi", "owner_id": "u1" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap();
    assert_eq!(body.as_object().unwrap().len(), 1);

    let (status, post) = app.get(&format!("/posts/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        post,
        json!({ "_id": id, "owner_id": "u1", "message": "hi" })
    );
}

#[tokio::test]
async fn get_with_illegal_id_is_bad_request() {
    let app = TestApp::new();
    app.create("u1", "hi").await;

    for id in ["not-an-id", "123", "zzzzzzzzzzzzzzzzzzzzzzzz"] {
        let (status, body) = app.get(&format!("/posts/{id}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "id {id}");
        assert_eq!(
            body["error"],
            "The requested post id wasn't a legal Mongo Object ID."
        );
    }
    assert_eq!(app.stored_count().await, 1);
}

#[tokio::test]
async fn get_with_unknown_id_is_not_found() {
    let app = TestApp::new();
    app.create("u1", "hi").await;

    let (status, body) = app.get("/posts/5f8d0d55b54764421b7156c9").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "The requested post was not found");
}

#[tokio::test]
async fn list_filters_by_owner() {
    let app = TestApp::new();
    app.create("u1", "a").await;
    app.create("u2", "b").await;
    app.create("u1", "c").await;

    let (status, body) = app.get("/posts?owner_id=u1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages(&body), ["a", "c"]);
    assert!(
        body.as_array()
            .unwrap()
            .iter()
            .all(|p| p["owner_id"] == "u1")
    );

    let (status, body) = app.get("/posts?owner_id=u3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn list_without_owner_returns_everything() {
    let app = TestApp::new();
    app.create("u1", "a").await;
    app.create("u2", "b").await;

    let (status, body) = app.get("/posts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages(&body), ["a", "b"]);
}

#[tokio::test]
async fn list_on_empty_collection_is_empty_array() {
    let app = TestApp::new();

    let (status, body) = app.get("/posts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn create_without_message_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app.post_json(json!({ "owner_id": "u1" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "message");
    assert_eq!(app.stored_count().await, 0);
}

#[tokio::test]
async fn create_without_owner_id_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app.post_json(json!({ "message": "hi" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "owner_id");
    assert_eq!(app.stored_count().await, 0);
}

#[tokio::test]
async fn create_with_null_field_is_rejected() {
    let app = TestApp::new();

    let (status, _) = app
        .post_json(json!({ "message": null, "owner_id": "u1" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.stored_count().await, 0);
}

#[tokio::test]
async fn create_with_malformed_body_is_bad_request() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Request::post("/posts")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app.post_json(json!({ "message": 42, "owner_id": "u1" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.stored_count().await, 0);
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = TestApp::new();

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_i64());
}

#[tokio::test]
async fn list_with_repeated_owner_uses_the_first() {
    let app = TestApp::new();
    app.create("u1", "a").await;
    app.create("u2", "b").await;

    let (status, body) = app.get("/posts?owner_id=u1&owner_id=u2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages(&body), ["a"]);
}

#[tokio::test]
async fn get_with_non_utf8_id_is_json_bad_request() {
    let app = TestApp::new();

    let (status, body) = app.get("/posts/%FF").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn concurrency_limit_is_shared_across_routes() {
    let store = Arc::new(ParkedStore::default());
    let router = router_with(store.clone(), &[("MAX_CONCURRENT_REQUESTS", "1")]);

    let listing = tokio::spawn(router.clone().oneshot(get_request("/posts")));
    store.entered.notified().await;

    let held = tokio::time::timeout(
        Duration::from_millis(200),
        router.clone().oneshot(get_request("/health")),
    )
    .await;
    assert!(held.is_err(), "/health ran while the only slot was taken");

    store.release.notify_one();
    let response = listing.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn slow_store_times_out_with_408() {
    let router = router_with(
        Arc::new(ParkedStore::default()),
        &[("REQUEST_TIMEOUT_SECS", "1")],
    );

    let response = router
        .oneshot(get_request("/posts/5f8d0d55b54764421b7156c9"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}
