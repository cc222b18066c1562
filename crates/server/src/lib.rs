//! gemm HTTP server
//!
//! Library half of the `gemm` binary: configuration, shared state, the bearer
//! token gate and the axum router. Handlers are thin; the work happens in the
//! `gemm-domain` use cases backed by `gemm-adapters`.

mod auth;
pub mod config;
mod error;
pub mod extract;
mod routes;
mod state;

pub use self::auth::require_token;
pub use self::config::AppConfig;
pub use self::error::ApiError;
pub use self::routes::router;
pub use self::state::{AppState, Dependencies};
