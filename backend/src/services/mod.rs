//! Business logic services
//!
//! Services receive their collaborators (account store, password policy,
//! token issuer) at construction and hold no other state.

pub mod login;
pub mod registration;

pub use login::LoginService;
pub use registration::{RegistrationForm, RegistrationService};
