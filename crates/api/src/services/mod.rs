//! Application services that sit outside the domain crate.

pub mod auth;

pub use auth::{AuthError, AuthService};
