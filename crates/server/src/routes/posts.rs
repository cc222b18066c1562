//! Post creation, lookup and tag search.

use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use gemm_domain::tags::render_tags;
use gemm_domain::usecases::PostDraft;
use gemm_domain::{Post, SessionClaims};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ApiError;
use crate::extract::JsonOrForm;
use crate::state::AppState;

/// Wire form of a post: `_id` for the id and tags rendered as `#a,#b`
#[derive(Debug, Serialize)]
pub struct PostView {
    #[serde(rename = "_id")]
    id: String,
    user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    body: String,
    tags: String,
    #[serde(with = "time::serde::rfc3339")]
    datetime: OffsetDateTime,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        Self {
            tags: render_tags(&post.tags),
            id: post.id,
            user_id: post.user_id,
            title: post.title,
            body: post.body,
            datetime: post.datetime,
        }
    }
}

fn views(posts: Vec<Post>) -> Vec<PostView> {
    posts.into_iter().map(PostView::from).collect()
}

#[derive(Debug, Deserialize)]
pub struct PostingQuery {
    #[serde(rename = "postId")]
    post_id: String,
}

pub async fn get_posting(
    State(state): State<AppState>,
    Query(params): Query<PostingQuery>,
) -> Result<Json<PostView>, ApiError> {
    let post = state
        .posts
        .get(&params.post_id)
        .await?
        .ok_or(ApiError::NotFound("No posting found!"))?;

    Ok(Json(post.into()))
}

pub async fn all_postings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<PostView>>, ApiError> {
    let posts = state.posts.by_author(&user_id).await?;
    Ok(Json(views(posts)))
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    title: Option<String>,
    body: String,
    tags: Option<String>,
}

/// Store a new post authored by the token subject.
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    JsonOrForm(request): JsonOrForm<CreateRequest>,
) -> Result<Json<PostView>, ApiError> {
    let draft = PostDraft {
        title: request.title,
        body: request.body,
        tags: request.tags,
    };

    let post = state
        .posts
        .create(&claims.sub, draft)
        .await
        .map_err(|e| ApiError::OperationFailed(e.to_string()))?;

    Ok(Json(post.into()))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(rename = "searchString")]
    search_string: String,
}

pub async fn search(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<SearchRequest>,
) -> Result<Json<Vec<PostView>>, ApiError> {
    let posts = state.posts.search(&request.search_string).await?;
    Ok(Json(views(posts)))
}
