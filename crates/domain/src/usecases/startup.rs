//! Startup gate: both datastores must answer before the service is ready

use thiserror::Error;

use crate::ports::{CredentialStore, PostStore};

/// Startup failure naming the dependency that could not be reached
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to connect to databases: {dependency} unavailable: {message}")]
    Unavailable {
        dependency: &'static str,
        message: String,
    },
}

/// Ping the credential store and the post store concurrently.
///
/// Returns on the first failure; there is a single attempt per dependency.
pub async fn wait_until_ready(
    credentials: &dyn CredentialStore,
    posts: &dyn PostStore,
) -> Result<(), StartupError> {
    let relational = async {
        credentials
            .ping()
            .await
            .map_err(|e| StartupError::Unavailable {
                dependency: "relational store",
                message: e.to_string(),
            })
    };

    let documents = async {
        posts.ping().await.map_err(|e| StartupError::Unavailable {
            dependency: "document store",
            message: e.to_string(),
        })
    };

    tokio::try_join!(relational, documents)?;

    tracing::info!("Datastores ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewPost, Post, UserProfile};
    use crate::ports::{CredentialError, PostStoreError};
    use async_trait::async_trait;
    use std::time::Duration;

    struct Relational {
        up: bool,
    }

    #[async_trait]
    impl CredentialStore for Relational {
        async fn authenticate(
            &self,
            _user_id: &str,
            _password: &str,
        ) -> Result<Option<UserProfile>, CredentialError> {
            Ok(None)
        }

        async fn get_user(&self, _user_id: &str) -> Result<Option<UserProfile>, CredentialError> {
            Ok(None)
        }

        async fn followers(&self, _user_id: &str) -> Result<Vec<String>, CredentialError> {
            Ok(vec![])
        }

        async fn following(&self, _user_id: &str) -> Result<Vec<String>, CredentialError> {
            Ok(vec![])
        }

        async fn add_follow(&self, _a: &str, _b: &str) -> Result<u64, CredentialError> {
            Ok(0)
        }

        async fn remove_follow(&self, _a: &str, _b: &str) -> Result<u64, CredentialError> {
            Ok(0)
        }

        async fn ping(&self) -> Result<(), CredentialError> {
            if self.up {
                Ok(())
            } else {
                Err(CredentialError::Unavailable("connection refused".to_string()))
            }
        }
    }

    struct Documents {
        up: bool,
        delay: Duration,
    }

    #[async_trait]
    impl PostStore for Documents {
        async fn insert(&self, _post: NewPost) -> Result<Post, PostStoreError> {
            Err(PostStoreError::Database("unused".to_string()))
        }

        async fn find_by_id(&self, _id: &str) -> Result<Option<Post>, PostStoreError> {
            Ok(None)
        }

        async fn find_by_author(&self, _user_id: &str) -> Result<Vec<Post>, PostStoreError> {
            Ok(vec![])
        }

        async fn find_by_tags(&self, _tags: &[String]) -> Result<Vec<Post>, PostStoreError> {
            Ok(vec![])
        }

        async fn ping(&self) -> Result<(), PostStoreError> {
            tokio::time::sleep(self.delay).await;
            if self.up {
                Ok(())
            } else {
                Err(PostStoreError::Unavailable("server selection timeout".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn test_ready_when_both_up() {
        let result = wait_until_ready(
            &Relational { up: true },
            &Documents {
                up: true,
                delay: Duration::ZERO,
            },
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_relational_failure_names_dependency() {
        let err = wait_until_ready(
            &Relational { up: false },
            &Documents {
                up: true,
                delay: Duration::ZERO,
            },
        )
        .await
        .unwrap_err();

        let StartupError::Unavailable { dependency, .. } = err;
        assert_eq!(dependency, "relational store");
    }

    #[tokio::test]
    async fn test_document_failure_names_dependency() {
        let err = wait_until_ready(
            &Relational { up: true },
            &Documents {
                up: false,
                delay: Duration::ZERO,
            },
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("document store"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_fast_without_waiting_for_slow_dependency() {
        let started = tokio::time::Instant::now();
        let result = wait_until_ready(
            &Relational { up: false },
            &Documents {
                up: true,
                delay: Duration::from_secs(30),
            },
        )
        .await;

        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(30));
    }
}
