//! Authentication collaborator
//!
//! Students log in anonymously. Professionals present a username and
//! password to an [`AuthProvider`]; [`StaticCredentials`] is a fixed
//! Argon2id-hashed user table for demos and tests. Hash verification runs
//! on the blocking thread pool, off the async workers.

use crate::session::Role;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Authentication failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Unknown user or wrong password
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Stored hash could not be parsed or produced
    #[error("credential store error: {0}")]
    Store(String),
}

/// Verifies professional credentials
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Check `username` and `password`, returning the granted role
    ///
    /// # Errors
    /// - `AuthError::InvalidCredentials` when they do not match
    async fn authenticate(&self, username: &str, password: &str) -> Result<Role, AuthError>;
}

/// In-memory user table with Argon2id password hashes
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: BTreeMap<String, String>,
}

impl StaticCredentials {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user, hashing `password`
    ///
    /// # Errors
    /// - `AuthError::Store` if hashing fails
    pub fn with_user(mut self, username: impl Into<String>, password: &str) -> Result<Self, AuthError> {
        let hash = hash_password(password)?;
        self.users.insert(username.into(), hash);
        Ok(self)
    }

    /// Add a user with an already hashed password in PHC format
    #[must_use]
    pub fn with_hashed_user(mut self, username: impl Into<String>, phc_hash: impl Into<String>) -> Self {
        self.users.insert(username.into(), phc_hash.into());
        self
    }

    /// Number of users
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// True when no user is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl AuthProvider for StaticCredentials {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Role, AuthError> {
        let Some(hash) = self.users.get(username).cloned() else {
            tracing::warn!(username, "unknown user");
            return Err(AuthError::InvalidCredentials);
        };
        let password = password.to_owned();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Store(format!("verification task failed: {e}")))??;
        if verified {
            Ok(Role::Professional)
        } else {
            tracing::warn!(username, "wrong password");
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Hash a password with Argon2id and a random salt, PHC string out
///
/// # Errors
/// - `AuthError::Store` if hashing fails
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Store(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Store(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Store(e.to_string())),
    }
}
