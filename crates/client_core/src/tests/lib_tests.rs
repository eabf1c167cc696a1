use std::sync::Arc;

use super::*;
use crate::test_support::file_reader;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    posts: Arc<Mutex<Vec<Post>>>,
    received: Arc<Mutex<Vec<(String, Option<PostPayload>)>>>,
}

async fn handle_list(State(state): State<ServerState>) -> Json<Vec<Post>> {
    state.received.lock().await.push(("GET".to_string(), None));
    Json(state.posts.lock().await.clone())
}

async fn handle_create(
    State(state): State<ServerState>,
    Json(payload): Json<PostPayload>,
) -> (StatusCode, Json<Post>) {
    state
        .received
        .lock()
        .await
        .push(("POST".to_string(), Some(payload.clone())));
    let mut posts = state.posts.lock().await;
    let created = Post {
        id: PostId::new(format!("id-{}", posts.len() + 1)),
        title: payload.title,
        description: payload.description,
        image: payload.image,
    };
    posts.push(created.clone());
    (StatusCode::CREATED, Json(created))
}

async fn handle_update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PostPayload>,
) -> Result<Json<Post>, StatusCode> {
    state
        .received
        .lock()
        .await
        .push((format!("PUT {id}"), Some(payload.clone())));
    let mut posts = state.posts.lock().await;
    let post = posts
        .iter_mut()
        .find(|post| post.id.as_str() == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    post.title = payload.title;
    post.description = payload.description;
    post.image = payload.image;
    Ok(Json(post.clone()))
}

async fn handle_delete(State(state): State<ServerState>, Path(id): Path<String>) -> StatusCode {
    state
        .received
        .lock()
        .await
        .push((format!("DELETE {id}"), None));
    state.posts.lock().await.retain(|post| post.id.as_str() != id);
    StatusCode::NO_CONTENT
}

async fn spawn_router(app: Router) -> std::io::Result<Url> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(Url::parse(&format!("http://{addr}")).expect("server url"))
}

async fn spawn_post_server(seed: Vec<Post>) -> (HttpPostService, ServerState) {
    let state = ServerState {
        posts: Arc::new(Mutex::new(seed)),
        ..ServerState::default()
    };
    let app = Router::new()
        .route("/api/posts", get(handle_list).post(handle_create))
        .route("/api/posts/:id", put(handle_update).delete(handle_delete))
        .with_state(state.clone());
    let url = spawn_router(app).await.expect("spawn server");
    (HttpPostService::new(url), state)
}

fn sample_post(id: &str) -> Post {
    Post {
        id: PostId::new(id),
        title: "A".to_string(),
        description: "d".to_string(),
        image: None,
    }
}

#[tokio::test]
async fn lists_posts_from_collection_endpoint() {
    let (service, _state) = spawn_post_server(vec![sample_post("1"), sample_post("2")]).await;

    let posts = service.list_posts().await.expect("list");

    let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["1", "2"]);
}

#[tokio::test]
async fn create_posts_full_payload_with_null_image() {
    let (service, state) = spawn_post_server(Vec::new()).await;

    let created = service
        .create_post(&PostPayload::new("T", "D", None))
        .await
        .expect("create");

    assert_eq!(created.map(|p| p.id), Some(PostId::new("id-1")));
    let received = state.received.lock().await.clone();
    assert_eq!(
        received,
        vec![("POST".to_string(), Some(PostPayload::new("T", "D", None)))]
    );
}

#[tokio::test]
async fn update_targets_post_by_id() {
    let (service, state) = spawn_post_server(vec![sample_post("abc123")]).await;
    let payload = PostPayload::new("New", "Body", Some("data:image/png;base64,AAAA".into()));

    service
        .update_post(&PostId::new("abc123"), &payload)
        .await
        .expect("update");

    let received = state.received.lock().await.clone();
    assert_eq!(received, vec![("PUT abc123".to_string(), Some(payload))]);
    assert_eq!(state.posts.lock().await[0].title, "New");
}

#[tokio::test]
async fn delete_accepts_empty_success_body() {
    let (service, state) = spawn_post_server(vec![sample_post("1")]).await;

    service
        .delete_post(&PostId::new("1"))
        .await
        .expect("delete");

    assert!(state.posts.lock().await.is_empty());
}

#[tokio::test]
async fn non_success_status_is_a_remote_failure() {
    let (service, _state) = spawn_post_server(Vec::new()).await;

    let err = service
        .update_post(&PostId::new("missing"), &PostPayload::new("T", "D", None))
        .await
        .expect_err("must fail");

    assert_eq!(err.operation, PostOperation::Update);
    assert!(err.message.contains("404"), "unexpected error: {err}");
}

#[tokio::test]
async fn error_body_message_is_folded_into_failure() {
    let app = Router::new().route(
        "/api/posts",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "message": "database offline" })),
            )
        }),
    );
    let url = spawn_router(app).await.expect("spawn server");
    let service = HttpPostService::new(url);

    let err = service.list_posts().await.expect_err("must fail");

    assert_eq!(err.operation, PostOperation::List);
    assert!(err.message.contains("500"));
    assert!(err.message.contains("database offline"));
}

#[tokio::test]
async fn malformed_listing_is_a_remote_failure() {
    let app = Router::new().route("/api/posts", get(|| async { "not json" }));
    let url = spawn_router(app).await.expect("spawn server");
    let service = HttpPostService::new(url);

    let err = service.list_posts().await.expect_err("must fail");
    assert_eq!(err.operation, PostOperation::List);
}

#[tokio::test]
async fn unreachable_service_is_a_remote_failure() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let service = HttpPostService::new(Url::parse(&format!("http://{addr}")).expect("url"));

    let err = service
        .delete_post(&PostId::new("1"))
        .await
        .expect_err("must fail");
    assert_eq!(err.operation, PostOperation::Delete);
}

#[test]
fn endpoint_appends_collection_path_and_escapes_id() {
    let service = HttpPostService::new(Url::parse("http://localhost:5000/").expect("url"));
    let collection = service
        .endpoint(PostOperation::List, None)
        .expect("collection url");
    assert_eq!(collection.as_str(), "http://localhost:5000/api/posts");

    let item = service
        .endpoint(PostOperation::Delete, Some(&PostId::new("a b/c")))
        .expect("item url");
    assert_eq!(item.as_str(), "http://localhost:5000/api/posts/a%20b%2Fc");
}

#[test]
fn endpoint_refuses_ids_that_collapse_to_the_collection() {
    let service = HttpPostService::new(Url::parse("http://localhost:5000/").expect("url"));
    for id in ["", ".", ".."] {
        let err = service
            .endpoint(PostOperation::Delete, Some(&PostId::new(id)))
            .expect_err("must refuse");
        assert_eq!(err.operation, PostOperation::Delete);
        assert!(err.message.contains("invalid post id"), "{err}");
    }

    let dotted = service
        .endpoint(PostOperation::Update, Some(&PostId::new("...")))
        .expect("item url");
    assert_eq!(dotted.as_str(), "http://localhost:5000/api/posts/...");
}

#[tokio::test]
async fn delete_with_dot_dot_id_never_reaches_the_collection() {
    let (service, state) = spawn_post_server(vec![sample_post("1")]).await;
    let mut listing = ListingController::new(Arc::new(service), file_reader());
    listing.refresh().await.expect("refresh");

    let err = listing
        .delete_post(&PostId::new(".."))
        .await
        .expect_err("must fail");

    assert!(matches!(err, ControllerError::Remote(_)));
    assert_eq!(listing.items().len(), 1);
    let received = state.received.lock().await.clone();
    assert_eq!(received, vec![("GET".to_string(), None)]);
}

#[test]
fn endpoint_keeps_base_path_prefix() {
    let service = HttpPostService::new(Url::parse("http://gateway.test/blog").expect("url"));
    let collection = service
        .endpoint(PostOperation::Create, None)
        .expect("collection url");
    assert_eq!(collection.as_str(), "http://gateway.test/blog/api/posts");
}

#[test]
fn remote_failure_names_the_operation() {
    let err = PostServiceError::new(PostOperation::Create, "connection refused");
    assert_eq!(err.to_string(), "create post failed: connection refused");
}
