//! Group invitation entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::invitation::{GroupInvitation, InvitationEnrichment};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the group_invitations table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupInvitationEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub used: bool,
}

impl From<GroupInvitationEntity> for GroupInvitation {
    fn from(entity: GroupInvitationEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            email: entity.email,
            token: entity.token,
            expires_at: entity.expires_at,
            created_at: entity.created_at,
            used: entity.used,
        }
    }
}

/// Group and inviter display data for one invitation.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationEnrichmentEntity {
    pub user_id: Option<Uuid>,
    pub group_name: String,
    pub group_image: Option<String>,
    pub inviter_name: Option<String>,
    pub inviter_email: Option<String>,
}

impl From<InvitationEnrichmentEntity> for InvitationEnrichment {
    fn from(entity: InvitationEnrichmentEntity) -> Self {
        Self {
            user_id: entity.user_id,
            group_name: entity.group_name,
            group_image: entity.group_image,
            inviter_name: entity.inviter_name,
            inviter_email: entity.inviter_email,
            message: None,
        }
    }
}

/// Invitation row joined with its display data, for listings.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationWithDetailsEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub used: bool,
    // Display fields
    pub user_id: Option<Uuid>,
    pub group_name: String,
    pub group_image: Option<String>,
    pub inviter_name: Option<String>,
    pub inviter_email: Option<String>,
}

impl From<InvitationWithDetailsEntity> for (GroupInvitation, InvitationEnrichment) {
    fn from(entity: InvitationWithDetailsEntity) -> Self {
        (
            GroupInvitation {
                id: entity.id,
                group_id: entity.group_id,
                email: entity.email,
                token: entity.token,
                expires_at: entity.expires_at,
                created_at: entity.created_at,
                used: entity.used,
            },
            InvitationEnrichment {
                user_id: entity.user_id,
                group_name: entity.group_name,
                group_image: entity.group_image,
                inviter_name: entity.inviter_name,
                inviter_email: entity.inviter_email,
                message: None,
            },
        )
    }
}
