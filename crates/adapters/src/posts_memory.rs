//! In-memory post store for testing and offline mode

use async_trait::async_trait;
use gemm_domain::{NewPost, Post, PostStore, PostStoreError};
use std::sync::RwLock;

/// In-memory post store implementation
///
/// Ids are 24 hex characters, like MongoDB ObjectIds, and increase with
/// insertion order.
pub struct InMemoryPostStore {
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(Vec::new()),
        }
    }

    fn matching(&self, predicate: impl Fn(&Post) -> bool) -> Result<Vec<Post>, PostStoreError> {
        let posts = self
            .posts
            .read()
            .map_err(|e| PostStoreError::Database(e.to_string()))?;
        Ok(posts.iter().filter(|p| predicate(p)).cloned().collect())
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert(&self, post: NewPost) -> Result<Post, PostStoreError> {
        let mut posts = self
            .posts
            .write()
            .map_err(|e| PostStoreError::Database(e.to_string()))?;
        let stored = Post::from_new(format!("{:024x}", posts.len() + 1), post);
        posts.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, PostStoreError> {
        Ok(self.matching(|p| p.id == id)?.into_iter().next())
    }

    async fn find_by_author(&self, user_id: &str) -> Result<Vec<Post>, PostStoreError> {
        self.matching(|p| p.user_id == user_id)
    }

    async fn find_by_tags(&self, tags: &[String]) -> Result<Vec<Post>, PostStoreError> {
        self.matching(|p| p.has_any_tag(tags))
    }

    async fn ping(&self) -> Result<(), PostStoreError> {
        Ok(())
    }
}
