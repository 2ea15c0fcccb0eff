//! Password policy enforcement
//!
//! A policy is a list of [`PasswordValidator`]s. Every validator runs and
//! all violations are returned together, so a registration form can show
//! each problem at once.
//!
//! Built-in rules:
//! - [`MinimumLengthValidator`]
//! - [`CommonPasswordValidator`]
//! - [`NumericPasswordValidator`]
//! - [`UserAttributeSimilarityValidator`]

use crate::config::PasswordPolicyConfig;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Account attributes a password is checked against
#[derive(Debug, Clone, Copy)]
pub struct AccountContext<'a> {
    pub username: &'a str,
    pub email: &'a str,
}

/// A single reason a password was rejected
///
/// `Display` is the message returned to the client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PasswordViolation {
    #[error("This password is too short. It must contain at least {min_length} characters.")]
    TooShort { min_length: usize },

    #[error("This password is too common.")]
    TooCommon,

    #[error("This password is entirely numeric.")]
    EntirelyNumeric,

    #[error("The password is too similar to the {attribute}.")]
    TooSimilar { attribute: &'static str },

    #[error("{0}")]
    Other(String),
}

/// Pluggable password rule
pub trait PasswordValidator: Send + Sync {
    /// Return every violation of this rule; empty when the password passes
    fn validate(&self, password: &str, context: &AccountContext<'_>) -> Vec<PasswordViolation>;
}

/// Rejects passwords shorter than `min_length` characters
#[derive(Debug, Clone)]
pub struct MinimumLengthValidator {
    pub min_length: usize,
}

impl PasswordValidator for MinimumLengthValidator {
    fn validate(&self, password: &str, _context: &AccountContext<'_>) -> Vec<PasswordViolation> {
        if password.chars().count() < self.min_length {
            vec![PasswordViolation::TooShort {
                min_length: self.min_length,
            }]
        } else {
            Vec::new()
        }
    }
}

/// Rejects passwords made only of digits
#[derive(Debug, Clone, Default)]
pub struct NumericPasswordValidator;

impl PasswordValidator for NumericPasswordValidator {
    fn validate(&self, password: &str, _context: &AccountContext<'_>) -> Vec<PasswordViolation> {
        if !password.is_empty() && password.chars().all(char::is_numeric) {
            vec![PasswordViolation::EntirelyNumeric]
        } else {
            Vec::new()
        }
    }
}

/// Rejects passwords found in the embedded common-password list
/// (case-insensitive, surrounding whitespace ignored)
#[derive(Debug, Clone, Default)]
pub struct CommonPasswordValidator;

impl CommonPasswordValidator {
    pub fn is_common(password: &str) -> bool {
        let lower = password.trim().to_lowercase();
        COMMON_PASSWORDS.contains(lower.as_str())
    }
}

impl PasswordValidator for CommonPasswordValidator {
    fn validate(&self, password: &str, _context: &AccountContext<'_>) -> Vec<PasswordViolation> {
        if Self::is_common(password) {
            vec![PasswordViolation::TooCommon]
        } else {
            Vec::new()
        }
    }
}

/// Rejects passwords too close to the username or email.
///
/// Each attribute is compared whole and split on non-alphanumeric
/// characters. Similarity is `2 * M / T` where `M` counts characters the
/// two strings share (as multisets) and `T` is their combined length.
/// Parts far shorter than the password are skipped, since a long
/// password containing a two-letter fragment is not similar to it.
#[derive(Debug, Clone)]
pub struct UserAttributeSimilarityValidator {
    pub max_similarity: f64,
}

impl Default for UserAttributeSimilarityValidator {
    fn default() -> Self {
        Self { max_similarity: 0.7 }
    }
}

impl UserAttributeSimilarityValidator {
    fn too_similar(&self, password: &str, value: &str) -> bool {
        let value = value.to_lowercase();
        value
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .chain(std::iter::once(value.as_str()))
            .filter(|part| !part.is_empty())
            .filter(|part| !self.exceeds_length_ratio(password, part))
            .any(|part| similarity_ratio(password, part) >= self.max_similarity)
    }

    fn exceeds_length_ratio(&self, password: &str, part: &str) -> bool {
        let pwd_len = password.chars().count() as f64;
        let part_len = part.chars().count() as f64;
        pwd_len >= 10.0 * part_len && part_len < self.max_similarity / 2.0 * pwd_len
    }
}

impl PasswordValidator for UserAttributeSimilarityValidator {
    fn validate(&self, password: &str, context: &AccountContext<'_>) -> Vec<PasswordViolation> {
        let password = password.to_lowercase();
        let attributes: [(&'static str, &str); 2] = [
            ("username", context.username),
            ("email address", context.email),
        ];

        attributes
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .find(|(_, value)| self.too_similar(&password, value))
            .map(|&(attribute, _)| vec![PasswordViolation::TooSimilar { attribute }])
            .unwrap_or_default()
    }
}

/// Upper-bound similarity of two strings, ignoring character order
fn similarity_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }

    let mut available: HashMap<char, usize> = HashMap::new();
    for c in b.chars() {
        *available.entry(c).or_default() += 1;
    }
    let mut matches = 0usize;
    for c in a.chars() {
        if let Some(n) = available.get_mut(&c) {
            if *n > 0 {
                *n -= 1;
                matches += 1;
            }
        }
    }

    2.0 * matches as f64 / total as f64
}

/// Composite policy running every configured validator
#[derive(Clone, Default)]
pub struct PasswordPolicy {
    validators: Vec<Arc<dyn PasswordValidator>>,
}

impl PasswordPolicy {
    /// Policy with no rules
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the standard rules from configuration
    pub fn from_config(config: &PasswordPolicyConfig) -> Self {
        let mut policy = Self::empty().with_validator(MinimumLengthValidator {
            min_length: config.min_length,
        });
        if config.check_similarity {
            policy = policy.with_validator(UserAttributeSimilarityValidator {
                max_similarity: config.max_similarity,
            });
        }
        if config.check_common {
            policy = policy.with_validator(CommonPasswordValidator);
        }
        if config.check_numeric {
            policy = policy.with_validator(NumericPasswordValidator);
        }
        policy
    }

    /// Append a rule
    pub fn with_validator(mut self, validator: impl PasswordValidator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl PasswordValidator for PasswordPolicy {
    fn validate(&self, password: &str, context: &AccountContext<'_>) -> Vec<PasswordViolation> {
        self.validators
            .iter()
            .flat_map(|v| v.validate(password, context))
            .collect()
    }
}

/// Frequently used passwords, lowercase, one per line
static COMMON_PASSWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    include_str!("common-passwords.txt")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
});
