//! Password hashing and verification.
//!
//! bcrypt is CPU-bound, so both operations run on the blocking thread pool
//! instead of stalling the async runtime.

use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Hashing error: {0}")]
    Hashing(String),
}

/// Hash a plain-text password with the default bcrypt cost.
pub async fn hash_password(password: &str) -> Result<String, PasswordError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        hash(password, DEFAULT_COST).map_err(|e| PasswordError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| PasswordError::Hashing(format!("task join error: {}", e)))?
}

/// Verify a plain-text password against a bcrypt hash.
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    tokio::task::spawn_blocking(move || {
        verify(password, &password_hash).map_err(|e| PasswordError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| PasswordError::Hashing(format!("task join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_and_verify() {
        let hashed = hash_password("hunter2!").await.unwrap();
        assert!(verify_password("hunter2!", &hashed).await.unwrap());
        assert!(!verify_password("wrong", &hashed).await.unwrap());
    }
}
