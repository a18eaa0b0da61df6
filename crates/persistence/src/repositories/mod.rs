//! Repository implementations for database operations.

pub mod group;
pub mod invitation;

pub use group::{GroupRepository, PgGroupTransaction};
pub use invitation::{InvitationRepository, PgInvitationTransaction};
