//! In-memory credential store for testing and offline mode
//!
//! Mirrors the constraints of `sql/schema.sql`: follow edges are unique per
//! pair and both ends must reference existing users.

use async_trait::async_trait;
use gemm_domain::{CredentialError, CredentialStore, UserProfile};
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

struct StoredUser {
    profile: UserProfile,
    password_sha1: String,
}

impl StoredUser {
    fn new(profile: UserProfile, password: &str) -> Self {
        Self {
            password_sha1: sha1_hex(password),
            profile,
        }
    }
}

/// In-memory credential store implementation
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, StoredUser>>,
    /// (follower, followee) in insertion order
    follows: RwLock<Vec<(String, String)>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            follows: RwLock::new(Vec::new()),
        }
    }

    /// Builder-style variant of [`Self::add_user`]
    ///
    /// Takes the store by value, so no other thread can hold or have
    /// poisoned the lock while the fixture is being built.
    pub fn with_user(mut self, profile: UserProfile, password: &str) -> Self {
        let stored = StoredUser::new(profile, password);
        self.users
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(stored.profile.user_id.clone(), stored);
        self
    }

    /// Register a user, hashing the password the way MySQL's `SHA1()` does
    pub fn add_user(&self, profile: UserProfile, password: &str) -> Result<(), CredentialError> {
        let stored = StoredUser::new(profile, password);
        let mut users = self
            .users
            .write()
            .map_err(|e| CredentialError::Database(e.to_string()))?;
        users.insert(stored.profile.user_id.clone(), stored);
        Ok(())
    }

    /// Number of follow edges currently stored
    pub fn follow_count(&self) -> usize {
        self.follows.read().map(|f| f.len()).unwrap_or_default()
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase hex SHA-1, matching MySQL's `SHA1()` output
fn sha1_hex(input: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn authenticate(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<Option<UserProfile>, CredentialError> {
        let users = self
            .users
            .read()
            .map_err(|e| CredentialError::Database(e.to_string()))?;
        let hash = sha1_hex(password);
        Ok(users
            .get(user_id)
            .filter(|u| u.password_sha1 == hash)
            .map(|u| u.profile.clone()))
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, CredentialError> {
        let users = self
            .users
            .read()
            .map_err(|e| CredentialError::Database(e.to_string()))?;
        Ok(users.get(user_id).map(|u| u.profile.clone()))
    }

    async fn followers(&self, user_id: &str) -> Result<Vec<String>, CredentialError> {
        let follows = self
            .follows
            .read()
            .map_err(|e| CredentialError::Database(e.to_string()))?;
        Ok(follows
            .iter()
            .filter(|(_, followee)| followee == user_id)
            .map(|(follower, _)| follower.clone())
            .collect())
    }

    async fn following(&self, user_id: &str) -> Result<Vec<String>, CredentialError> {
        let follows = self
            .follows
            .read()
            .map_err(|e| CredentialError::Database(e.to_string()))?;
        Ok(follows
            .iter()
            .filter(|(follower, _)| follower == user_id)
            .map(|(_, followee)| followee.clone())
            .collect())
    }

    async fn add_follow(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> Result<u64, CredentialError> {
        {
            let users = self
                .users
                .read()
                .map_err(|e| CredentialError::Database(e.to_string()))?;
            if !users.contains_key(follower_id) || !users.contains_key(followee_id) {
                return Err(CredentialError::Constraint(format!(
                    "foreign key constraint fails for ({}, {})",
                    follower_id, followee_id
                )));
            }
        }

        let mut follows = self
            .follows
            .write()
            .map_err(|e| CredentialError::Database(e.to_string()))?;
        if follows
            .iter()
            .any(|(a, b)| a == follower_id && b == followee_id)
        {
            return Err(CredentialError::Constraint(format!(
                "Duplicate entry '{}-{}'",
                follower_id, followee_id
            )));
        }
        follows.push((follower_id.to_string(), followee_id.to_string()));
        Ok(1)
    }

    async fn remove_follow(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> Result<u64, CredentialError> {
        let mut follows = self
            .follows
            .write()
            .map_err(|e| CredentialError::Database(e.to_string()))?;
        let before = follows.len();
        follows.retain(|(a, b)| !(a == follower_id && b == followee_id));
        Ok((before - follows.len()) as u64)
    }

    async fn ping(&self) -> Result<(), CredentialError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str) -> UserProfile {
        UserProfile {
            user_id: id.to_string(),
            profile_name: id.to_uppercase(),
            country: "Singapore".to_string(),
        }
    }

    fn store() -> InMemoryCredentialStore {
        InMemoryCredentialStore::new()
            .with_user(profile("fred"), "yabbadabbadoo")
            .with_user(profile("wilma"), "pebbles")
    }

    #[test]
    fn test_sha1_matches_mysql_output() {
        // SELECT SHA1('abc')
        assert_eq!(sha1_hex("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[tokio::test]
    async fn test_authenticate_checks_password() {
        let store = store();

        let ok = store.authenticate("fred", "yabbadabbadoo").await.unwrap();
        assert_eq!(ok, Some(profile("fred")));

        assert!(store.authenticate("fred", "pebbles").await.unwrap().is_none());
        assert!(store.authenticate("barney", "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_follow_edges_by_direction() {
        let store = store();
        assert_eq!(store.add_follow("fred", "wilma").await.unwrap(), 1);

        assert_eq!(store.followers("wilma").await.unwrap(), vec!["fred"]);
        assert_eq!(store.following("fred").await.unwrap(), vec!["wilma"]);
        assert!(store.followers("fred").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_follow_violates_unique_key() {
        let store = store();
        store.add_follow("fred", "wilma").await.unwrap();

        let result = store.add_follow("fred", "wilma").await;
        assert!(matches!(result, Err(CredentialError::Constraint(_))));
        assert_eq!(store.follow_count(), 1);
    }

    #[tokio::test]
    async fn test_follow_requires_existing_users() {
        let store = store();

        let result = store.add_follow("fred", "barney").await;
        assert!(matches!(result, Err(CredentialError::Constraint(_))));
        assert_eq!(store.follow_count(), 0);
    }

    #[tokio::test]
    async fn test_unfollow_missing_edge_affects_nothing() {
        let store = store();
        store.add_follow("fred", "wilma").await.unwrap();

        assert_eq!(store.remove_follow("fred", "wilma").await.unwrap(), 1);
        assert_eq!(store.remove_follow("fred", "wilma").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_user_registers_login() {
        let store = store();
        store.add_user(profile("barney"), "rubble").unwrap();

        let found = store.authenticate("barney", "rubble").await.unwrap();
        assert_eq!(found.map(|p| p.user_id), Some("barney".to_string()));
    }

    #[test]
    fn test_add_user_reports_poisoned_lock() {
        let store = store();

        std::thread::scope(|s| {
            let poisoner = s.spawn(|| {
                let _guard = store.users.write().unwrap();
                panic!("writer died holding the lock");
            });
            assert!(poisoner.join().is_err());
        });

        let result = store.add_user(profile("barney"), "rubble");
        assert!(matches!(result, Err(CredentialError::Database(_))));
    }
}
