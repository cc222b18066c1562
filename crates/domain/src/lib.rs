//! gemm domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `tags`: Tag normalization and rendering
//! - `usecases`: Application use cases / business logic

pub mod model;
pub mod ports;
pub mod tags;
pub mod usecases;

pub use model::*;
pub use ports::*;

/// Issuer claim stamped on every session token
pub const TOKEN_ISSUER: &str = "gemm";

/// Lifetime of a session token in seconds
pub const TOKEN_TTL_SECS: i64 = 60 * 60;
