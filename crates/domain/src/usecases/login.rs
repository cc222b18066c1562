//! Login use case: credential check followed by token issuance

use std::sync::Arc;

use thiserror::Error;

use crate::{
    model::{Identity, LoginOutcome},
    ports::{Clock, CredentialStore, TokenError, TokenService},
};

/// Errors surfaced by the login flow
#[derive(Debug, Error)]
pub enum LoginError {
    /// Wrong credentials or an unreachable store; callers cannot tell which
    #[error("Incorrect username and password")]
    InvalidCredentials,
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Use case for authenticating users and issuing session tokens
pub struct LoginUseCase {
    credentials: Arc<dyn CredentialStore>,
    tokens: Arc<dyn TokenService>,
    clock: Arc<dyn Clock>,
}

impl LoginUseCase {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        tokens: Arc<dyn TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            tokens,
            clock,
        }
    }

    /// Check a username/password pair against the credential store
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Identity, LoginError> {
        match self.credentials.authenticate(username, password).await {
            Ok(Some(profile)) => Ok(Identity::from_profile(profile, self.clock.now())),
            Ok(None) => {
                tracing::info!(username = %username, "Rejected login");
                Err(LoginError::InvalidCredentials)
            }
            Err(e) => {
                tracing::error!(username = %username, error = %e, "Credential lookup failed");
                Err(LoginError::InvalidCredentials)
            }
        }
    }

    /// Authenticate and issue a bearer token for the resulting identity
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, LoginError> {
        let identity = self.authenticate(username, password).await?;
        let token = self.tokens.issue(&identity, identity.login_time)?;

        tracing::info!(user_id = %identity.username, "User logged in");

        Ok(LoginOutcome { token, identity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LoginData, SessionClaims, UserProfile};
    use crate::ports::{CredentialError, FixedClock};
    use async_trait::async_trait;
    use time::OffsetDateTime;
    use time::macros::datetime;

    struct FakeCredentials {
        fail: bool,
    }

    #[async_trait]
    impl CredentialStore for FakeCredentials {
        async fn authenticate(
            &self,
            user_id: &str,
            password: &str,
        ) -> Result<Option<UserProfile>, CredentialError> {
            if self.fail {
                return Err(CredentialError::Unavailable("connection refused".to_string()));
            }
            if user_id == "fred" && password == "secret" {
                Ok(Some(UserProfile {
                    user_id: "fred".to_string(),
                    profile_name: "Fred".to_string(),
                    country: "Singapore".to_string(),
                }))
            } else {
                Ok(None)
            }
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
            Ok(())
        }
    }

    /// Encodes claims as plain JSON so the use case can be checked without crypto
    struct FakeTokens;

    impl TokenService for FakeTokens {
        fn issue(&self, identity: &Identity, now: OffsetDateTime) -> Result<String, TokenError> {
            let claims = SessionClaims {
                iss: "gemm".to_string(),
                sub: identity.username.clone(),
                iat: now.unix_timestamp(),
                exp: now.unix_timestamp() + 3600,
                data: LoginData {
                    login_time: now.to_string(),
                },
            };
            serde_json::to_string(&claims).map_err(|e| TokenError::Signing(e.to_string()))
        }

        fn verify(&self, token: &str, _now: OffsetDateTime) -> Result<SessionClaims, TokenError> {
            serde_json::from_str(token).map_err(|e| TokenError::Invalid(e.to_string()))
        }
    }

    fn use_case(fail: bool) -> LoginUseCase {
        LoginUseCase::new(
            Arc::new(FakeCredentials { fail }),
            Arc::new(FakeTokens),
            Arc::new(FixedClock(datetime!(2024-01-15 12:00 UTC))),
        )
    }

    #[tokio::test]
    async fn test_authenticate_builds_identity() {
        let identity = use_case(false).authenticate("fred", "secret").await.unwrap();

        assert_eq!(identity.username, "fred");
        assert_eq!(identity.profile_name, "Fred");
        assert_eq!(identity.country, "Singapore");
        assert_eq!(identity.login_time, datetime!(2024-01-15 12:00 UTC));
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let result = use_case(false).login("fred", "wrong").await;
        assert!(matches!(result, Err(LoginError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_store_failure_looks_like_bad_credentials() {
        let result = use_case(true).login("fred", "secret").await;
        assert!(matches!(result, Err(LoginError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_issues_token_for_subject() {
        let outcome = use_case(false).login("fred", "secret").await.unwrap();
        let claims = FakeTokens
            .verify(&outcome.token, OffsetDateTime::now_utc())
            .unwrap();

        assert_eq!(claims.sub, "fred");
        assert_eq!(claims.exp, claims.iat + 3600);
    }
}
