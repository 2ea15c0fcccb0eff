//! Account persistence
//!
//! The [`AccountStore`] port is what the services depend on; the
//! PostgreSQL and in-memory adapters implement it.

pub mod account;
pub mod memory;
pub mod postgres;

pub use account::{Account, AccountStore, NewAccount, StoreError, UniqueField};
pub use memory::InMemoryAccountStore;
pub use postgres::PostgresAccountStore;
