//! Domain services for the group service.
//!
//! Services contain business logic that operates on domain models. Storage is
//! reached through the transaction traits defined here and implemented by the
//! persistence crate.

pub mod group;
pub mod invitation;

pub use group::{GroupError, GroupService, GroupStore, GroupTransaction};
pub use invitation::{
    InvitationError, InvitationPolicy, InvitationService, InvitationStore, InvitationTransaction,
};
