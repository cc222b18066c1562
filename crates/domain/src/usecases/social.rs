//! User lookups and the follow graph

use std::sync::Arc;

use thiserror::Error;

use crate::{
    model::{FollowEdge, UserProfile},
    ports::{CredentialError, CredentialStore},
};

/// Errors from follow/unfollow
#[derive(Debug, Error)]
pub enum FollowError {
    /// The statement ran but touched no rows
    #[error("no follow edge was changed")]
    Unchanged,
    #[error(transparent)]
    Store(#[from] CredentialError),
}

/// Use case over users and follow edges
pub struct SocialGraphUseCase {
    credentials: Arc<dyn CredentialStore>,
}

impl SocialGraphUseCase {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }

    pub async fn user(&self, user_id: &str) -> Result<Option<UserProfile>, CredentialError> {
        self.credentials.get_user(user_id).await
    }

    pub async fn followers(&self, user_id: &str) -> Result<Vec<String>, CredentialError> {
        self.credentials.followers(user_id).await
    }

    pub async fn following(&self, user_id: &str) -> Result<Vec<String>, CredentialError> {
        self.credentials.following(user_id).await
    }

    /// Record that `edge.follower_id` follows `edge.followee_id`
    pub async fn follow(&self, edge: &FollowEdge) -> Result<u64, FollowError> {
        let affected = self
            .credentials
            .add_follow(&edge.follower_id, &edge.followee_id)
            .await?;
        Self::changed(edge, affected, "follow")
    }

    /// Remove the edge; a missing edge is reported as `Unchanged`
    pub async fn unfollow(&self, edge: &FollowEdge) -> Result<u64, FollowError> {
        let affected = self
            .credentials
            .remove_follow(&edge.follower_id, &edge.followee_id)
            .await?;
        Self::changed(edge, affected, "unfollow")
    }

    fn changed(edge: &FollowEdge, affected: u64, action: &str) -> Result<u64, FollowError> {
        tracing::info!(
            follower = %edge.follower_id,
            followee = %edge.followee_id,
            affected,
            action,
            "Follow graph update"
        );

        if affected == 0 {
            return Err(FollowError::Unchanged);
        }
        Ok(affected)
    }
}
