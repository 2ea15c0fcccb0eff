//! Application state management
//!
//! Everything a handler needs is built once at startup and injected here:
//! the account store, the token issuer and the two services wired to them.
//! All fields are Arc-backed, so cloning the state per request is cheap.

use crate::auth::{JwtService, PasswordPolicy, PasswordValidator};
use crate::config::AppConfig;
use crate::repositories::AccountStore;
use crate::services::{LoginService, RegistrationService};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: Arc<dyn AccountStore>,
    pub jwt: JwtService,
    pub registration: RegistrationService,
    pub login: LoginService,
}

impl AppState {
    /// Create application state with the password policy from config
    pub fn new(accounts: Arc<dyn AccountStore>, config: AppConfig) -> Self {
        let policy = PasswordPolicy::from_config(&config.password_policy);
        Self::with_password_validator(accounts, Arc::new(policy), config)
    }

    /// Create application state with a custom password validator
    pub fn with_password_validator(
        accounts: Arc<dyn AccountStore>,
        password_validator: Arc<dyn PasswordValidator>,
        config: AppConfig,
    ) -> Self {
        let jwt = JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.refresh_token_expiry_secs,
        );
        let registration = RegistrationService::new(accounts.clone(), password_validator);
        let login = LoginService::new(accounts.clone(), jwt.clone(), config.jwt.rotate_refresh_tokens);

        Self {
            config: Arc::new(config),
            accounts,
            jwt,
            registration,
            login,
        }
    }

    #[inline]
    pub fn accounts(&self) -> &dyn AccountStore {
        self.accounts.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}
