use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::{Health, StoreStats};
use service::posts::PostService;
use service::storage::PostStore;

use crate::observability;

pub mod posts;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService<dyn PostStore>>,
}

impl AppState {
    pub fn new(posts: PostService<dyn PostStore>) -> Self {
        Self { posts: Arc::new(posts) }
    }
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn stats(State(state): State<AppState>) -> Json<StoreStats> {
    Json(state.posts.stats().await)
}

async fn metrics() -> (StatusCode, String) {
    observability::encode_metrics()
}

/// Build the application router: post CRUD under `/v1`, plus health, stats and metrics.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/v1/posts", post(posts::create_post))
        .route(
            "/v1/posts/:id",
            get(posts::get_post).patch(posts::update_post).delete(posts::delete_post),
        );

    Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/metrics", get(metrics))
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx and transport failures
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
