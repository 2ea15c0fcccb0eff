//! In-memory account store
//!
//! Backs tests and local runs without PostgreSQL. Uniqueness is checked
//! and the insert performed under a single write lock.

use super::account::{Account, AccountStore, NewAccount, StoreError, UniqueField};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    /// Mark an account active or inactive; returns false if it does not exist
    #[cfg(test)]
    pub async fn set_active(&self, id: Uuid, active: bool) -> bool {
        match self.accounts.write().await.get_mut(&id) {
            Some(account) => {
                account.is_active = active;
                true
            }
            None => false,
        }
    }

    /// Remove an account; returns false if it does not exist
    #[cfg(test)]
    pub async fn remove(&self, id: Uuid) -> bool {
        self.accounts.write().await.remove(&id).is_some()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().await;

        if accounts.values().any(|a| a.username == account.username) {
            return Err(StoreError::Duplicate(UniqueField::Username));
        }
        if accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::Duplicate(UniqueField::Email));
        }

        let record = Account {
            id: Uuid::new_v4(),
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            is_active: true,
            created_at: Utc::now(),
        };
        accounts.insert(record.id, record.clone());

        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().any(|a| a.username == username))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().any(|a| a.email == email))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
