//! PostgreSQL account store

use super::account::{Account, AccountStore, NewAccount, StoreError, UniqueField};
use crate::config::DatabaseConfig;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

/// Account store backed by the `accounts` table
#[derive(Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool sized and timed by `config`
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let options = PgConnectOptions::from_str(&config.url)?.application_name("accounts-api");
        let pool = pool_options(config).connect_with(options).await?;

        info!(
            max = config.max_connections,
            min = config.min_connections,
            "Account store pool created"
        );
        Ok(Self::new(pool))
    }

    /// Bring the `accounts` schema up to date
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        info!("Running account store migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
}

/// Map a sqlx error, turning unique-constraint violations into duplicates.
///
/// The raw database message is logged and never handed to callers.
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some(c) if c.contains("email") => StoreError::Duplicate(UniqueField::Email),
                _ => StoreError::Duplicate(UniqueField::Username),
            };
        }
    }
    error!("Account store query failed: {:?}", err);
    StoreError::Backend("database query failed".to_string())
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, is_active, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, is_active, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }
}
