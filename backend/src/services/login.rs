//! Login and token refresh
//!
//! Credentials are checked with a single authenticate-by-email step.
//! Unknown email, wrong password and inactive account all surface as the
//! same [`ApiError::InvalidCredentials`], and the unknown-email path still
//! spends one password hash so response timing does not reveal which
//! emails are registered.

use crate::auth::{JwtService, PasswordService, TokenError};
use crate::error::ApiError;
use crate::repositories::{Account, AccountStore};
use accounts_shared::validation::normalize_email;
use accounts_shared::{LoginResponse, PublicAccount, RefreshResponse};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Login / token handler
#[derive(Clone)]
pub struct LoginService {
    accounts: Arc<dyn AccountStore>,
    tokens: JwtService,
    rotate_refresh_tokens: bool,
}

impl LoginService {
    pub fn new(accounts: Arc<dyn AccountStore>, tokens: JwtService, rotate_refresh_tokens: bool) -> Self {
        Self {
            accounts,
            tokens,
            rotate_refresh_tokens,
        }
    }

    /// Resolve credentials to an active account
    pub async fn authenticate(&self, email: &str, password: &SecretString) -> Result<Account, ApiError> {
        let email = normalize_email(email);
        let password = password.expose_secret().to_string();

        let Some(account) = self.accounts.find_by_email(&email).await? else {
            // Comparable cost to a real verification
            let _ = PasswordService::hash_async(password).await;
            debug!("Login failed: no matching account");
            return Err(ApiError::InvalidCredentials);
        };

        let valid = PasswordService::verify_async(password, account.password_hash.clone())
            .await
            .unwrap_or_else(|e| {
                error!(account_id = %account.id, "Password verification failed: {:?}", e);
                false
            });

        if !valid || !account.is_active {
            debug!(account_id = %account.id, "Login failed: credentials rejected");
            return Err(ApiError::InvalidCredentials);
        }

        Ok(account)
    }

    /// Authenticate and issue an access/refresh token pair
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<LoginResponse, ApiError> {
        let account = self.authenticate(email, password).await?;

        let access = self.tokens.generate_access_token(account.id)?;
        let refresh = self.tokens.generate_refresh_token(account.id)?;

        info!(account_id = %account.id, "Login successful");
        Ok(LoginResponse {
            message: "Login successful".to_string(),
            username: account.username,
            access,
            refresh,
        })
    }

    /// Exchange a valid refresh token for a new access token
    ///
    /// The account must still exist and be active. With rotation enabled a
    /// new refresh token is returned as well.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ApiError> {
        let claims = self.tokens.validate_refresh_token(refresh_token)?;
        let account_id = claims.account_id()?;

        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .filter(|a| a.is_active)
            .ok_or(ApiError::Token(TokenError::AccountUnavailable))?;

        let access = self.tokens.generate_access_token(account.id)?;
        let refresh = if self.rotate_refresh_tokens {
            Some(self.tokens.generate_refresh_token(account.id)?)
        } else {
            None
        };

        Ok(RefreshResponse { access, refresh })
    }

    /// Public view of the account an access token belongs to
    pub async fn current_account(&self, account_id: Uuid) -> Result<PublicAccount, ApiError> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .map(|a| a.to_public())
            .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))
    }
}
