//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod group;
pub mod invitation;

pub use group::{GroupEntity, GroupMembershipEntity, GroupRoleDb};
pub use invitation::{
    GroupInvitationEntity, InvitationEnrichmentEntity, InvitationWithDetailsEntity,
};
