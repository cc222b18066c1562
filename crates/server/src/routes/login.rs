//! Credential login.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;

use crate::error::ApiError;
use crate::extract::JsonOrForm;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    message: String,
    token: String,
    #[serde(rename = "profileName")]
    profile_name: String,
    user_id: String,
    country: String,
}

/// Exchange a username/password pair for a signed bearer token.
///
/// Credentials may arrive as JSON or as an HTML form post.
pub async fn login(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = state.login.login(&request.username, &request.password).await?;
    let identity = outcome.identity;

    let login_time = identity
        .login_time
        .format(&Rfc3339)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(LoginResponse {
        message: format!("Login at {}", login_time),
        token: outcome.token,
        profile_name: identity.profile_name,
        user_id: identity.username,
        country: identity.country,
    }))
}
