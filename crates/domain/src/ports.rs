//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{Identity, NewPost, Post, SessionClaims, UserProfile};

/// Error type for credential store operations
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Constraint violated: {0}")]
    Constraint(String),
    #[error("Connection unavailable: {0}")]
    Unavailable(String),
}

/// Port for the relational store holding users and follow edges
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user whose stored password hash matches `password`
    async fn authenticate(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<Option<UserProfile>, CredentialError>;

    /// Get a user's public profile
    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, CredentialError>;

    /// Ids of users following `user_id`
    async fn followers(&self, user_id: &str) -> Result<Vec<String>, CredentialError>;

    /// Ids of users that `user_id` follows
    async fn following(&self, user_id: &str) -> Result<Vec<String>, CredentialError>;

    /// Insert a follow edge, returning the number of affected rows
    async fn add_follow(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> Result<u64, CredentialError>;

    /// Delete a follow edge, returning the number of affected rows
    async fn remove_follow(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> Result<u64, CredentialError>;

    /// Check connectivity
    async fn ping(&self) -> Result<(), CredentialError>;
}

/// Error type for post store operations
#[derive(Debug, Error)]
pub enum PostStoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Connection unavailable: {0}")]
    Unavailable(String),
}

/// Port for the document store holding posts
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a post and return the stored representation
    async fn insert(&self, post: NewPost) -> Result<Post, PostStoreError>;

    /// Find a post by id. Ids the store cannot parse yield `None`.
    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, PostStoreError>;

    /// All posts of an author in insertion order
    async fn find_by_author(&self, user_id: &str) -> Result<Vec<Post>, PostStoreError>;

    /// Posts having at least one of `tags`, in insertion order
    async fn find_by_tags(&self, tags: &[String]) -> Result<Vec<Post>, PostStoreError>;

    /// Check connectivity
    async fn ping(&self) -> Result<(), PostStoreError>;
}

/// Error type for token operations
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("token expired")]
    Expired,
    #[error("token not yet valid")]
    NotYetValid,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Port for issuing and verifying session tokens
pub trait TokenService: Send + Sync {
    /// Issue a signed token for an authenticated identity
    fn issue(&self, identity: &Identity, now: OffsetDateTime) -> Result<String, TokenError>;

    /// Verify signature and validity window, returning the decoded claims
    fn verify(&self, token: &str, now: OffsetDateTime) -> Result<SessionClaims, TokenError>;
}

/// Error type for weather lookups
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Network error: {0}")]
    Network(String),
}

/// Port for the external weather service
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current weather for a location, passed through as returned upstream
    async fn current(&self, country: &str) -> Result<serde_json::Value, WeatherError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock frozen at a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
