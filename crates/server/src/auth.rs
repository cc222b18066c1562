//! Bearer token middleware

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

/// Middleware that requires a valid session token.
///
/// The token must be provided in the `Authorization` header as:
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// On success the decoded [`gemm_domain::SessionClaims`] are added to the
/// request extensions for handlers to pick up.
pub async fn require_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!("missing authorization header");
            ApiError::CannotAccess
        })?;

    let token = bearer_token(auth_header).ok_or_else(|| {
        tracing::debug!("malformed authorization header");
        ApiError::CannotAccess
    })?;

    let claims = state
        .tokens
        .verify(token, state.clock.now())
        .map_err(|e| ApiError::IncorrectToken(e.to_string()))?;

    tracing::debug!(user_id = %claims.sub, "token accepted");
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Extract `<token>` from `Bearer <token>`
fn bearer_token(header: &str) -> Option<&str> {
    let mut terms = header.split(' ');
    match (terms.next(), terms.next()) {
        (Some("Bearer"), Some(token)) if !token.is_empty() => Some(token),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("bearer abc"), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
