//! Accounts API Backend Library
//!
//! Account registration, credential login and signed token issuance.
//! Exposed as a library for the server binary and integration tests.

pub mod auth;
pub mod config;
pub mod error;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
