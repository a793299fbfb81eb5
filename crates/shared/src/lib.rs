//! Shared utilities for the foodfight backend.
//!
//! - Password hashing with Argon2id
//! - JWT access token issuing and validation

pub mod jwt;
pub mod password;
