//! Authentication module
//!
//! Signed JWT access/refresh tokens, argon2 password hashing, the
//! pluggable password policy and the bearer-token extractor.

mod jwt;
mod middleware;
mod password;
pub mod policy;

pub use jwt::{Claims, JwtService, TokenError, TokenType};
pub use middleware::AuthUser;
pub use password::PasswordService;
pub use policy::{AccountContext, PasswordPolicy, PasswordValidator, PasswordViolation};
