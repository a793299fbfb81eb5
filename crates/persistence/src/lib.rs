//! Persistence layer for the foodfight backend.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations of the domain store traits
//! - Query metrics

pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod repositories;
