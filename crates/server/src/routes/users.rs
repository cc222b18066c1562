//! User profiles and the follow graph.

use axum::Json;
use axum::extract::{Path, State};
use gemm_domain::{FollowEdge, UserProfile};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extract::JsonOrForm;
use crate::state::AppState;

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state
        .social
        .user(&user_id)
        .await?
        .ok_or(ApiError::NotFound("Not found!"))?;

    Ok(Json(user))
}

/// Row of the follower list: a user following the requested one
#[derive(Debug, Serialize)]
pub struct FollowerRow {
    user_id: String,
}

/// Row of the following list: a user the requested one follows
#[derive(Debug, Serialize)]
pub struct FollowingRow {
    follow_id: String,
}

pub async fn followers(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<FollowerRow>>, ApiError> {
    let rows = state.social.followers(&user_id).await?;
    Ok(Json(
        rows.into_iter()
            .map(|user_id| FollowerRow { user_id })
            .collect(),
    ))
}

pub async fn following(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<FollowingRow>>, ApiError> {
    let rows = state.social.following(&user_id).await?;
    Ok(Json(
        rows.into_iter()
            .map(|follow_id| FollowingRow { follow_id })
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    #[serde(rename = "currentUser")]
    current_user: String,
    #[serde(rename = "followUser")]
    follow_user: String,
}

impl FollowRequest {
    fn edge(&self) -> FollowEdge {
        FollowEdge::new(&self.current_user, &self.follow_user)
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    #[serde(rename = "affectedRows")]
    affected_rows: u64,
}

pub async fn follow(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<FollowRequest>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let affected_rows = state.social.follow(&request.edge()).await?;
    Ok(Json(UpdateResponse { affected_rows }))
}

pub async fn unfollow(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<FollowRequest>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let affected_rows = state.social.unfollow(&request.edge()).await?;
    Ok(Json(UpdateResponse { affected_rows }))
}
