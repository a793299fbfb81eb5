//! Domain layer for the foodfight backend.
//!
//! This crate contains:
//! - Domain models (groups, invitations, competitions, restaurants, ratings)
//! - Store traits the persistence layer implements. Unit tests run against
//!   an in-memory implementation
//! - Business services: scoring, membership, invitations, participation,
//!   favorites and ratings
//! - Domain error types

pub mod errors;
pub mod models;
pub mod services;
pub mod stores;

pub use errors::{DomainError, StoreError};
