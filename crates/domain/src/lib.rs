//! Domain layer for the group service backend.
//!
//! This crate contains:
//! - Domain models (Group, GroupPatch, GroupInvitation)
//! - Business logic services over storage traits
//! - Domain error types

pub mod models;
pub mod services;
