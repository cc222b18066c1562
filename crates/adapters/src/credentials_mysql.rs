//! MySQL credential store implementation
//!
//! Expects the `users` and `follow` tables described in `sql/schema.sql`.
//! Passwords are compared store-side with `SHA1(?)`.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use gemm_domain::{CredentialError, CredentialStore, UserProfile};
use secrecy::{ExposeSecret, SecretString};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlSslMode};
use sqlx::Connection;

const AUTHENTICATE: &str =
    "select user_id, profile_name, country from users where user_id=? and password=SHA1(?)";
const GET_USER: &str = "select user_id, profile_name, country from users where user_id=?";
const GET_FOLLOWERS: &str = "select user_id from follow where follow_id=?";
const GET_FOLLOWING: &str = "select follow_id from follow where user_id=?";
const FOLLOW: &str = "insert into follow(user_id, follow_id) values (?,?)";
const UNFOLLOW: &str = "delete from follow where user_id=? and follow_id=?";

/// Connection settings for the MySQL pool
#[derive(Debug, Clone)]
pub struct MySqlSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: SecretString,
    pub max_connections: u32,
    /// Upper bound on waiting for a pooled connection
    pub acquire_timeout: Duration,
    /// CA certificate; enables verified TLS when set
    pub ssl_ca: Option<PathBuf>,
}

/// MySQL-backed store for users and follow edges
pub struct MySqlCredentialStore {
    pool: MySqlPool,
}

impl MySqlCredentialStore {
    /// Build the pool without opening any connection yet.
    ///
    /// Connectivity is checked by [`CredentialStore::ping`] at startup.
    pub fn connect_lazy(settings: &MySqlSettings) -> Self {
        let mut options = MySqlConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .database(&settings.database)
            .username(&settings.user)
            .password(settings.password.expose_secret());

        if let Some(ca) = &settings.ssl_ca {
            options = options.ssl_mode(MySqlSslMode::VerifyCa).ssl_ca(ca);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_lazy_with(options);

        tracing::debug!(
            host = %settings.host,
            port = settings.port,
            database = %settings.database,
            max_connections = settings.max_connections,
            "MySQL pool configured"
        );

        Self { pool }
    }

    /// Close the pool, waiting for checked-out connections to come back
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn map_sqlx_error(e: sqlx::Error) -> CredentialError {
    match e {
        sqlx::Error::Database(db)
            if db.is_unique_violation() || db.is_foreign_key_violation() =>
        {
            CredentialError::Constraint(db.message().to_string())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            CredentialError::Unavailable(e.to_string())
        }
        other => CredentialError::Database(other.to_string()),
    }
}

#[async_trait]
impl CredentialStore for MySqlCredentialStore {
    async fn authenticate(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<Option<UserProfile>, CredentialError> {
        let row: Option<(String, String, String)> = sqlx::query_as(AUTHENTICATE)
            .bind(user_id)
            .bind(password)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|(user_id, profile_name, country)| UserProfile {
            user_id,
            profile_name,
            country,
        }))
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, CredentialError> {
        let row: Option<(String, String, String)> = sqlx::query_as(GET_USER)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|(user_id, profile_name, country)| UserProfile {
            user_id,
            profile_name,
            country,
        }))
    }

    async fn followers(&self, user_id: &str) -> Result<Vec<String>, CredentialError> {
        let rows: Vec<(String,)> = sqlx::query_as(GET_FOLLOWERS)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn following(&self, user_id: &str) -> Result<Vec<String>, CredentialError> {
        let rows: Vec<(String,)> = sqlx::query_as(GET_FOLLOWING)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn add_follow(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> Result<u64, CredentialError> {
        let result = sqlx::query(FOLLOW)
            .bind(follower_id)
            .bind(followee_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn remove_follow(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> Result<u64, CredentialError> {
        let result = sqlx::query(UNFOLLOW)
            .bind(follower_id)
            .bind(followee_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), CredentialError> {
        // The pooled connection goes back to the pool when dropped, on every path
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        conn.ping().await.map_err(map_sqlx_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_settings() -> MySqlSettings {
        MySqlSettings {
            host: "127.0.0.1".to_string(),
            port: 1,
            database: "gemm".to_string(),
            user: "fred".to_string(),
            password: SecretString::new("secret".into()),
            max_connections: 5,
            acquire_timeout: Duration::from_millis(500),
            ssl_ca: None,
        }
    }

    #[tokio::test]
    async fn test_ping_unreachable_server_is_unavailable() {
        let store = MySqlCredentialStore::connect_lazy(&unreachable_settings());

        let result = store.ping().await;

        assert!(matches!(result, Err(CredentialError::Unavailable(_))));
        store.close().await;
    }

    #[tokio::test]
    async fn test_closed_pool_is_unavailable() {
        let store = MySqlCredentialStore::connect_lazy(&unreachable_settings());
        store.close().await;

        let result = store.get_user("fred").await;

        assert!(matches!(result, Err(CredentialError::Unavailable(_))));
    }
}
