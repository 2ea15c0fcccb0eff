//! Account record and the store port

use accounts_shared::PublicAccount;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Persisted account
///
/// `password_hash` is a PHC-format argon2 string and never leaves the
/// backend; use [`Account::to_public`] for anything sent to a client.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn to_public(&self) -> PublicAccount {
        PublicAccount {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Input for creating an account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Columns that must be unique across accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl UniqueField {
    /// Request field name the violation is reported against
    pub fn field_name(self) -> &'static str {
        match self {
            UniqueField::Username => "username",
            UniqueField::Email => "email",
        }
    }

    /// Client-facing message for a duplicate value
    pub fn duplicate_message(self) -> &'static str {
        match self {
            UniqueField::Username => "A user with that username already exists.",
            UniqueField::Email => "A user with this email already exists.",
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Errors raised by account stores
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate {0}")]
    Duplicate(UniqueField),

    #[error("account store failure: {0}")]
    Backend(String),
}

/// Port for reading and creating accounts
///
/// Implementations must enforce username and email uniqueness atomically
/// in [`AccountStore::create`]; the `*_exists` checks are advisory only.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist a new account, failing with [`StoreError::Duplicate`] when
    /// the username or email is taken
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError>;

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    /// Check that the store can serve requests
    async fn health_check(&self) -> Result<(), StoreError>;
}
