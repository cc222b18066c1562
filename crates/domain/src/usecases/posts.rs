//! Post creation, lookup and tag search

use std::sync::Arc;

use crate::{
    model::{NewPost, Post},
    ports::{Clock, PostStore, PostStoreError},
    tags::normalize_tags,
};

/// Fields supplied by a client when creating a post
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: Option<String>,
    pub body: String,
    /// Free text with inline "#tag" tokens; falls back to `body` when absent
    pub tags: Option<String>,
}

/// Use case for reading and writing posts
pub struct PostsUseCase {
    posts: Arc<dyn PostStore>,
    clock: Arc<dyn Clock>,
}

impl PostsUseCase {
    pub fn new(posts: Arc<dyn PostStore>, clock: Arc<dyn Clock>) -> Self {
        Self { posts, clock }
    }

    /// Normalize the draft's tags and store it under `author`
    pub async fn create(&self, author: &str, draft: PostDraft) -> Result<Post, PostStoreError> {
        let tags = normalize_tags(draft.tags.as_deref().unwrap_or(&draft.body));

        let post = NewPost {
            user_id: author.to_string(),
            title: draft.title,
            body: draft.body,
            tags,
            datetime: self.clock.now(),
        };

        let stored = self.posts.insert(post).await?;
        tracing::info!(post_id = %stored.id, user_id = %author, tags = ?stored.tags, "Created post");

        Ok(stored)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Post>, PostStoreError> {
        self.posts.find_by_id(id).await
    }

    pub async fn by_author(&self, user_id: &str) -> Result<Vec<Post>, PostStoreError> {
        self.posts.find_by_author(user_id).await
    }

    /// Find posts tagged with any term of the search string
    pub async fn search(&self, search_string: &str) -> Result<Vec<Post>, PostStoreError> {
        let terms = normalize_tags(search_string);
        tracing::debug!(terms = ?terms, "Searching posts");
        self.posts.find_by_tags(&terms).await
    }
}
