//! Request and response types for the accounts API

use crate::errors::FieldErrors;
use crate::validation::{NON_FIELD_ERRORS, NOT_A_STRING, NULL_FIELD};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Registration request
///
/// Missing fields deserialize as empty strings so that validation can
/// report every absent field together.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "empty_secret")]
    pub password: SecretString,
}

impl RegisterRequest {
    /// Read a registration body field by field.
    ///
    /// Numbers are taken as their decimal text. A null or any other
    /// non-string value leaves the field empty and is reported against that
    /// field, so one badly typed field does not hide errors in the others.
    /// A body that is not a JSON object fails as a whole.
    pub fn from_json(body: &Value) -> Result<(Self, FieldErrors), FieldErrors> {
        let Value::Object(fields) = body else {
            let mut errors = FieldErrors::new();
            errors.add(
                NON_FIELD_ERRORS,
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_kind(body)
                ),
            );
            return Err(errors);
        };

        let mut errors = FieldErrors::new();
        let mut text = |name: &str| match fields.get(name) {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Null) => {
                errors.add(name, NULL_FIELD);
                String::new()
            }
            Some(_) => {
                errors.add(name, NOT_A_STRING);
                String::new()
            }
        };

        let request = Self {
            username: text("username"),
            email: text("email"),
            password: SecretString::new(text("password")),
        };
        Ok((request, errors))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Public-safe account representation (never carries the password)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicAccount {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicAccount,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default = "empty_secret")]
    pub password: SecretString,
}

/// Login response carrying the issued token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub username: String,
    pub access: String,
    pub refresh: String,
}

/// Token refresh request
///
/// A missing token reads as empty and fails validation like any other bad
/// token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh: String,
}

/// Token refresh response
///
/// `refresh` is only present when refresh tokens are rotated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

/// Plain message body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}
