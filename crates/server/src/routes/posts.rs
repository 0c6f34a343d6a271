use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use models::Post;
use service::posts::{CreatePostInput, UpdatePostInput};

use super::AppState;
use crate::errors::JsonApiError;
use crate::observability::{record, REQUEST_DURATION};

/// Success envelope shared by every post operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
    pub success: bool,
    pub message: String,
}

impl PostResponse {
    fn ok(post: Option<Post>, message: &str) -> Self {
        Self { post, success: true, message: message.to_string() }
    }
}

/// PATCH body; the id comes from the path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

pub async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<CreatePostInput>, JsonRejection>,
) -> Result<(StatusCode, Json<PostResponse>), JsonApiError> {
    let Json(input) = payload?;
    let _timer = REQUEST_DURATION.with_label_values(&["create"]).start_timer();
    let result = state.posts.create(input).await;
    record("create", &result);
    let post = result?;
    Ok((StatusCode::CREATED, Json(PostResponse::ok(Some(post), "Post created successfully"))))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>, JsonApiError> {
    let _timer = REQUEST_DURATION.with_label_values(&["get"]).start_timer();
    let result = state.posts.get(&id).await;
    record("get", &result);
    Ok(Json(PostResponse::ok(Some(result?), "Post retrieved successfully")))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePostBody>, JsonRejection>,
) -> Result<Json<PostResponse>, JsonApiError> {
    let Json(body) = payload?;
    let input = UpdatePostInput { id, title: body.title, content: body.content, tags: body.tags };
    let _timer = REQUEST_DURATION.with_label_values(&["update"]).start_timer();
    let result = state.posts.update(input).await;
    record("update", &result);
    Ok(Json(PostResponse::ok(Some(result?), "Post updated successfully")))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>, JsonApiError> {
    let _timer = REQUEST_DURATION.with_label_values(&["delete"]).start_timer();
    let result = state.posts.delete(&id).await;
    record("delete", &result);
    result?;
    Ok(Json(PostResponse::ok(None, "Post deleted successfully")))
}
