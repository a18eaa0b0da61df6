//! Persistence layer for the group service backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations of the domain storage traits
//! - Query metrics

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
