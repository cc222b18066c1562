//! gemm adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `credentials`: MySQL and in-memory stores for users and follow edges
//! - `posts`: MongoDB and in-memory post stores
//! - `tokens`: JWT session tokens
//! - `weather`: weatherapi.com client

mod credentials_memory;
mod credentials_mysql;
mod posts_memory;
mod posts_mongo;
mod token_jwt;
mod weather_api;

/// Re-exports for credential store adapters
pub mod credentials {
    pub use crate::credentials_memory::InMemoryCredentialStore;
    pub use crate::credentials_mysql::{MySqlCredentialStore, MySqlSettings};
}

/// Re-exports for post store adapters
pub mod posts {
    pub use crate::posts_memory::InMemoryPostStore;
    pub use crate::posts_mongo::{MongoPostStore, MongoSettings};
}

/// Re-exports for token adapters
pub mod tokens {
    pub use crate::token_jwt::JwtTokenService;
}

/// Re-exports for weather adapters
pub mod weather {
    pub use crate::weather_api::WeatherApiClient;
}
