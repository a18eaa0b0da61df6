//! Domain models for the group service.

pub mod group;
pub mod invitation;

pub use group::{Group, GroupMembership, GroupPatch, GroupRole, UpdateFields};
pub use invitation::{GroupInvitation, GroupInvitationWithDetails, InvitationStatus};
