//! Shared application state

use std::sync::Arc;

use gemm_domain::usecases::{LoginUseCase, PostsUseCase, SocialGraphUseCase};
use gemm_domain::{Clock, CredentialStore, PostStore, TokenService, WeatherSource};

/// Adapters the server is built from, constructed once at startup
pub struct Dependencies {
    pub credentials: Arc<dyn CredentialStore>,
    pub posts: Arc<dyn PostStore>,
    pub tokens: Arc<dyn TokenService>,
    pub weather: Arc<dyn WeatherSource>,
    pub clock: Arc<dyn Clock>,
}

/// Shared application state available to all request handlers
#[derive(Clone)]
pub struct AppState {
    pub login: Arc<LoginUseCase>,
    pub posts: Arc<PostsUseCase>,
    pub social: Arc<SocialGraphUseCase>,
    pub tokens: Arc<dyn TokenService>,
    pub weather: Arc<dyn WeatherSource>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(deps: Dependencies) -> Self {
        Self {
            login: Arc::new(LoginUseCase::new(
                deps.credentials.clone(),
                deps.tokens.clone(),
                deps.clock.clone(),
            )),
            posts: Arc::new(PostsUseCase::new(deps.posts, deps.clock.clone())),
            social: Arc::new(SocialGraphUseCase::new(deps.credentials)),
            tokens: deps.tokens,
            weather: deps.weather,
            clock: deps.clock,
        }
    }
}
