//! HTTP route handlers.

pub mod auth;
pub mod competitions;
pub mod groups;
pub mod health;
pub mod invitations;
pub mod restaurants;
pub mod users;
