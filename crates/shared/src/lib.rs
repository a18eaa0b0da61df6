//! Shared utilities for the group service backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Invitation token generation
//! - Common validation logic

pub mod crypto;
pub mod validation;
