//! Group invitation models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Default expiration days for invitations.
pub const DEFAULT_EXPIRATION_DAYS: i64 = 7;

/// Maximum expiration days for invitations.
pub const MAX_EXPIRATION_DAYS: i64 = 30;

/// A pending or redeemed invitation to join a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupInvitation {
    pub id: Uuid,
    pub group_id: Uuid,
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub used: bool,
}

impl GroupInvitation {
    /// Current status at the given instant.
    pub fn status_at(&self, now: DateTime<Utc>) -> InvitationStatus {
        if self.used {
            InvitationStatus::Used
        } else if self.expires_at <= now {
            InvitationStatus::Expired
        } else {
            InvitationStatus::Pending
        }
    }
}

/// Invitation status.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Used,
    Expired,
}

/// Display data joined onto an invitation for presentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvitationEnrichment {
    pub user_id: Option<Uuid>,
    pub group_name: String,
    pub group_image: Option<String>,
    pub inviter_name: Option<String>,
    pub inviter_email: Option<String>,
    pub message: Option<String>,
}

/// Read-only projection of an invitation with group and inviter details.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupInvitationWithDetails {
    pub id: Uuid,
    pub group_id: Uuid,
    /// Account of the invitee, when one exists for the email.
    pub user_id: Option<Uuid>,
    pub email: String,
    pub token: String,
    pub used: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub group_name: String,
    pub group_image: String,
    pub inviter_name: String,
    pub inviter_email: String,
    pub message: String,
}

impl GroupInvitationWithDetails {
    pub fn assemble(invitation: GroupInvitation, enrichment: InvitationEnrichment) -> Self {
        Self {
            id: invitation.id,
            group_id: invitation.group_id,
            user_id: enrichment.user_id,
            email: invitation.email,
            token: invitation.token,
            used: invitation.used,
            expires_at: invitation.expires_at,
            created_at: invitation.created_at,
            group_name: enrichment.group_name,
            group_image: enrichment.group_image.unwrap_or_default(),
            inviter_name: enrichment.inviter_name.unwrap_or_default(),
            inviter_email: enrichment.inviter_email.unwrap_or_default(),
            message: enrichment.message.unwrap_or_default(),
        }
    }
}

/// Request to invite someone to a group by email.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateInvitationRequest {
    #[validate(email(message = "Invalid email address"))]
    #[validate(length(max = 255, message = "Email must be at most 255 characters"))]
    pub email: String,

    /// Days until expiration (1-30, default from configuration).
    #[validate(range(
        min = 1,
        max = 30,
        message = "Expiration must be between 1 and 30 days"
    ))]
    pub expires_in_days: Option<i64>,

    /// Personal note shown alongside the invitation.
    #[validate(length(max = 500, message = "Message must be at most 500 characters"))]
    pub message: Option<String>,
}

/// An invitation ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvitation {
    pub group_id: Uuid,
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Response for a single invitation lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InvitationResponse {
    #[serde(flatten)]
    pub invitation: GroupInvitationWithDetails,
    pub status: InvitationStatus,
}

/// Response for listing invitations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListInvitationsResponse {
    pub data: Vec<GroupInvitationWithDetails>,
    pub count: usize,
}

/// Response after accepting an invitation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AcceptInvitationResponse {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub already_member: bool,
}

/// Computes an expiration instant `days` after `now`.
pub fn calculate_expiration(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now + Duration::days(days)
}
