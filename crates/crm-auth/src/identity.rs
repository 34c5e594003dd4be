//! Identity provider seam
//!
//! Credentials are owned by an external identity provider. User
//! administration only needs to create accounts, rotate passwords and
//! remove accounts again when a profile write fails.

use async_trait::async_trait;
use crm_core::traits::Id;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

/// Identity provider errors
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("An account with email {0} already exists")]
    DuplicateEmail(String),
    #[error("Account not found")]
    NotFound,
    #[error("Failed to hash password: {0}")]
    Hashing(String),
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a confirmed account, returning its id
    async fn create_account(&self, email: &str, password: &str) -> Result<Id, IdentityError>;

    async fn update_password(&self, id: Id, password: &str) -> Result<(), IdentityError>;

    async fn delete_account(&self, id: Id) -> Result<(), IdentityError>;
}

#[derive(Debug, Clone)]
struct StoredAccount {
    email: String,
    password_hash: String,
}

/// In-process identity provider holding argon2 password hashes
#[derive(Debug, Default)]
pub struct MemoryIdentityProvider {
    accounts: RwLock<HashMap<Id, StoredAccount>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify a password for the account with this email
    pub fn verify(&self, email: &str, password: &str) -> bool {
        let accounts = self.accounts.read();
        accounts
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .is_some_and(|a| verify_password(password, &a.password_hash))
    }

    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }
}

fn hash_password(password: &str) -> Result<String, IdentityError> {
    use argon2::{
        password_hash::{PasswordHasher, SaltString},
        Argon2,
    };

    let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())
        .map_err(|e| IdentityError::Hashing(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IdentityError::Hashing(e.to_string()))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    use argon2::{
        password_hash::{PasswordHash, PasswordVerifier},
        Argon2,
    };

    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn create_account(&self, email: &str, password: &str) -> Result<Id, IdentityError> {
        let password_hash = hash_password(password)?;

        let mut accounts = self.accounts.write();
        if accounts.values().any(|a| a.email.eq_ignore_ascii_case(email)) {
            return Err(IdentityError::DuplicateEmail(email.to_string()));
        }

        let id = uuid::Uuid::new_v4();
        accounts.insert(
            id,
            StoredAccount {
                email: email.to_string(),
                password_hash,
            },
        );
        tracing::debug!(account_id = %id, "Identity account created");
        Ok(id)
    }

    async fn update_password(&self, id: Id, password: &str) -> Result<(), IdentityError> {
        let password_hash = hash_password(password)?;
        let mut accounts = self.accounts.write();
        let account = accounts.get_mut(&id).ok_or(IdentityError::NotFound)?;
        account.password_hash = password_hash;
        Ok(())
    }

    async fn delete_account(&self, id: Id) -> Result<(), IdentityError> {
        self.accounts
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(IdentityError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_verify() {
        let idp = MemoryIdentityProvider::new();
        let id = idp.create_account("a@example.com", "secret1").await.unwrap();

        assert!(idp.verify("a@example.com", "secret1"));
        assert!(!idp.verify("a@example.com", "wrong"));

        idp.update_password(id, "secret2").await.unwrap();
        assert!(idp.verify("a@example.com", "secret2"));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let idp = MemoryIdentityProvider::new();
        idp.create_account("a@example.com", "secret1").await.unwrap();
        let err = idp.create_account("A@example.com", "secret1").await.unwrap_err();
        assert!(matches!(err, IdentityError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_delete_account() {
        let idp = MemoryIdentityProvider::new();
        let id = idp.create_account("a@example.com", "secret1").await.unwrap();
        idp.delete_account(id).await.unwrap();
        assert_eq!(idp.account_count(), 0);
        assert!(matches!(
            idp.delete_account(id).await,
            Err(IdentityError::NotFound)
        ));
    }
}
