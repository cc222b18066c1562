//! API route definitions.

mod health;
mod login;
mod posts;
mod users;
mod weather;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::auth::require_token;
use crate::state::AppState;

/// Build the complete API router.
///
/// # Route Structure
///
/// ## Public (no auth)
/// - `GET /health` - Health check
/// - `POST /api/login` - Exchange credentials for a bearer token
///
/// ## Protected (bearer token required)
/// - `GET /api/weather?country=` - Current weather proxy
/// - `GET /api/posting?postId=` - One post
/// - `GET /api/all_postings/{userId}` - All posts by a user
/// - `POST /api/create` - Create a post
/// - `POST /api/search/` - Tag search
/// - `GET /api/user/{userId}` - User profile
/// - `GET /api/user/followers/{userId}` - Follower ids
/// - `GET /api/user/following/{userId}` - Followee ids
/// - `POST /api/follow/` - Add a follow edge
/// - `POST /api/unfollow/` - Remove a follow edge
///
/// Paths registered with a trailing slash also answer without it.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/login", post(login::login));

    let protected = Router::new()
        .route("/weather", get(weather::current))
        // Posts
        .route("/posting", get(posts::get_posting))
        .route("/all_postings/{user_id}", get(posts::all_postings))
        .route("/create", post(posts::create))
        .route("/search", post(posts::search))
        .route("/search/", post(posts::search))
        // Users and the follow graph
        .route("/user/{user_id}", get(users::get_user))
        .route("/user/followers/{user_id}", get(users::followers))
        .route("/user/following/{user_id}", get(users::following))
        .route("/follow", post(users::follow))
        .route("/follow/", post(users::follow))
        .route("/unfollow", post(users::unfollow))
        .route("/unfollow/", post(users::unfollow))
        .layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .merge(public)
        .nest("/api", protected)
        .with_state(state)
}
