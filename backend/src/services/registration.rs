//! Account registration
//!
//! Validates every field, enforces the password policy, hashes the
//! password off the async runtime and creates exactly one account.

use crate::auth::{AccountContext, PasswordService, PasswordValidator};
use crate::error::ApiError;
use crate::repositories::{AccountStore, NewAccount, StoreError, UniqueField};
use accounts_shared::validation::{normalize_email, validate_email, validate_username, BLANK_FIELD};
use accounts_shared::{FieldErrors, PublicAccount, RegisterRequest};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{debug, info};

/// Registration body together with errors for fields that could not be read
#[derive(Debug)]
pub struct RegistrationForm {
    pub request: RegisterRequest,
    pub errors: FieldErrors,
}

impl From<RegisterRequest> for RegistrationForm {
    fn from(request: RegisterRequest) -> Self {
        Self {
            request,
            errors: FieldErrors::new(),
        }
    }
}

/// Registration handler
#[derive(Clone)]
pub struct RegistrationService {
    accounts: Arc<dyn AccountStore>,
    password_policy: Arc<dyn PasswordValidator>,
}

impl RegistrationService {
    pub fn new(accounts: Arc<dyn AccountStore>, password_policy: Arc<dyn PasswordValidator>) -> Self {
        Self {
            accounts,
            password_policy,
        }
    }

    /// Register a new account
    ///
    /// Fails with [`ApiError::Validation`] carrying every failing field;
    /// nothing is persisted in that case.
    pub async fn register(&self, form: impl Into<RegistrationForm>) -> Result<PublicAccount, ApiError> {
        let RegistrationForm { request: req, mut errors } = form.into();
        let username = req.username.trim().to_string();
        let email = normalize_email(&req.email);
        let password = req.password.expose_secret();

        // Fields that could not be read are already reported
        if !errors.has_field("username") {
            errors.extend("username", validate_username(&username));
        }
        if !errors.has_field("email") {
            errors.extend("email", validate_email(&email));
        }

        if !errors.has_field("password") {
            if password.is_empty() {
                errors.add("password", BLANK_FIELD);
            } else {
                let context = AccountContext {
                    username: &username,
                    email: &email,
                };
                errors.extend(
                    "password",
                    self.password_policy
                        .validate(password, &context)
                        .iter()
                        .map(ToString::to_string),
                );
            }
        }

        // Only well-formed values are worth a uniqueness lookup
        if !errors.has_field("username") && self.accounts.username_exists(&username).await? {
            errors.add("username", UniqueField::Username.duplicate_message());
        }
        if !errors.has_field("email") && self.accounts.email_exists(&email).await? {
            errors.add("email", UniqueField::Email.duplicate_message());
        }

        if let Err(errors) = errors.into_result() {
            debug!(fields = ?errors.fields().collect::<Vec<_>>(), "Registration rejected");
            return Err(ApiError::Validation(errors));
        }

        let password_hash = PasswordService::hash_async(password.to_string()).await?;

        let account = self
            .accounts
            .create(NewAccount {
                username,
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration
                StoreError::Duplicate(field) => {
                    let mut errors = FieldErrors::new();
                    errors.add(field.field_name(), field.duplicate_message());
                    ApiError::Validation(errors)
                }
                other => ApiError::Store(other),
            })?;

        info!(account_id = %account.id, "Account registered");
        Ok(account.to_public())
    }
}
