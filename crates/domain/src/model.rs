//! Domain models and value objects

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Public profile of a registered user
///
/// The password hash lives only in the credential store and never leaves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier (also the login name)
    pub user_id: String,
    /// Display name
    pub profile_name: String,
    /// Country used for weather lookups
    pub country: String,
}

/// Directed follow relationship: `follower_id` follows `followee_id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower_id: String,
    pub followee_id: String,
}

impl FollowEdge {
    pub fn new(follower_id: impl Into<String>, followee_id: impl Into<String>) -> Self {
        Self {
            follower_id: follower_id.into(),
            followee_id: followee_id.into(),
        }
    }
}

/// A post waiting to be inserted into the post store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    /// Author (token subject of the creator)
    pub user_id: String,
    pub title: Option<String>,
    pub body: String,
    /// Normalized tags (lower-case, no leading "#")
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub datetime: OffsetDateTime,
}

/// A stored post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Store-generated identifier
    pub id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub body: String,
    /// Normalized tags (lower-case, no leading "#")
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub datetime: OffsetDateTime,
}

impl Post {
    /// Attach a store-generated id to a new post
    pub fn from_new(id: impl Into<String>, post: NewPost) -> Self {
        Self {
            id: id.into(),
            user_id: post.user_id,
            title: post.title,
            body: post.body,
            tags: post.tags,
            datetime: post.datetime,
        }
    }

    /// Whether any of the given terms is among this post's tags
    pub fn has_any_tag(&self, terms: &[String]) -> bool {
        self.tags.iter().any(|t| terms.contains(t))
    }
}

/// Identity produced by a successful authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User id the credentials belong to
    pub username: String,
    pub profile_name: String,
    pub country: String,
    #[serde(with = "time::serde::rfc3339")]
    pub login_time: OffsetDateTime,
}

impl Identity {
    pub fn from_profile(profile: UserProfile, login_time: OffsetDateTime) -> Self {
        Self {
            username: profile.user_id,
            profile_name: profile.profile_name,
            country: profile.country,
            login_time,
        }
    }
}

/// Payload embedded in every session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginData {
    /// RFC 3339 timestamp of the login that produced the token
    #[serde(rename = "loginTime")]
    pub login_time: String,
}

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Issuer (service name)
    pub iss: String,
    /// Subject (user id)
    pub sub: String,
    /// Issued at, unix seconds
    pub iat: i64,
    /// Expiry, unix seconds
    pub exp: i64,
    pub data: LoginData,
}

impl SessionClaims {
    /// Whether `now` falls inside the `[iat, exp)` window
    pub fn is_active_at(&self, now: OffsetDateTime) -> bool {
        let now = now.unix_timestamp();
        self.iat <= now && now < self.exp
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Signed bearer token
    pub token: String,
    pub identity: Identity,
}
