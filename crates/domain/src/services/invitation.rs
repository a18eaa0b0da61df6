//! Invitation issuance, lookup and redemption.

use chrono::Utc;
use shared::crypto::generate_invitation_token;
use shared::validation::{normalize_email, validate_future_timestamp};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::group::GroupRole;
use crate::models::invitation::{
    calculate_expiration, AcceptInvitationResponse, CreateInvitationRequest, GroupInvitation,
    GroupInvitationWithDetails, InvitationEnrichment, InvitationResponse, InvitationStatus,
    NewInvitation, DEFAULT_EXPIRATION_DAYS, MAX_EXPIRATION_DAYS,
};

/// Attempts at finding an unused token before giving up.
const MAX_TOKEN_ATTEMPTS: usize = 100;

/// Errors produced by [`InvitationService`].
#[derive(Debug, Error)]
pub enum InvitationError {
    #[error("Invitation not found")]
    NotFound,

    #[error("Invitation has already been used")]
    AlreadyUsed,

    #[error("Invitation has expired")]
    Expired,

    #[error("An active invitation already exists for this email address")]
    ActiveInvitationExists,

    #[error("Invalid expiration: {0}")]
    InvalidExpiry(String),

    #[error("Could not generate a unique invitation token")]
    TokenExhausted,

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Expiration policy for new invitations.
#[derive(Debug, Clone, Copy)]
pub struct InvitationPolicy {
    pub default_expiry_days: i64,
    pub max_expiry_days: i64,
}

impl Default for InvitationPolicy {
    fn default() -> Self {
        Self {
            default_expiry_days: DEFAULT_EXPIRATION_DAYS,
            max_expiry_days: MAX_EXPIRATION_DAYS,
        }
    }
}

/// Invitation storage.
#[async_trait::async_trait]
pub trait InvitationStore: Send + Sync {
    type Tx: InvitationTransaction;

    async fn begin(&self) -> Result<Self::Tx, sqlx::Error>;

    async fn find_by_token(&self, token: &str) -> Result<Option<GroupInvitation>, sqlx::Error>;

    async fn token_exists(&self, token: &str) -> Result<bool, sqlx::Error>;

    /// Group and inviter display data for an invitation.
    async fn enrichment(
        &self,
        invitation: &GroupInvitation,
    ) -> Result<InvitationEnrichment, sqlx::Error>;

    /// Unused, unexpired invitations of a group with display data, newest first.
    async fn list_pending(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<(GroupInvitation, InvitationEnrichment)>, sqlx::Error>;
}

/// A single invitation write transaction.
#[async_trait::async_trait]
pub trait InvitationTransaction: Send {
    /// Serialize issuance for one invitee of a group until the transaction ends.
    async fn lock_invitee(&mut self, group_id: Uuid, email: &str) -> Result<(), sqlx::Error>;

    /// Unused, unexpired invitation for `email` in the group, if any.
    async fn find_active_for_email(
        &mut self,
        group_id: Uuid,
        email: &str,
    ) -> Result<Option<GroupInvitation>, sqlx::Error>;

    async fn insert_invitation(
        &mut self,
        invitation: &NewInvitation,
    ) -> Result<GroupInvitation, sqlx::Error>;

    /// Mark the invitation used if it is still unused and unexpired.
    /// Returns false if another redemption got there first or it expired.
    async fn mark_used(&mut self, invitation_id: Uuid) -> Result<bool, sqlx::Error>;

    /// Add a member. Returns false if the user already belonged to the group.
    async fn add_member(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
        role: GroupRole,
    ) -> Result<bool, sqlx::Error>;

    async fn commit(self) -> Result<(), sqlx::Error>;

    async fn rollback(self) -> Result<(), sqlx::Error>;
}

/// Invitation operations over an [`InvitationStore`].
pub struct InvitationService<S> {
    store: S,
    policy: InvitationPolicy,
}

impl<S: InvitationStore> InvitationService<S> {
    pub fn new(store: S, policy: InvitationPolicy) -> Self {
        Self { store, policy }
    }

    /// Issue an invitation to `request.email` for the group.
    pub async fn issue(
        &self,
        group_id: Uuid,
        request: CreateInvitationRequest,
    ) -> Result<GroupInvitationWithDetails, InvitationError> {
        let days = request
            .expires_in_days
            .unwrap_or(self.policy.default_expiry_days);
        if days > self.policy.max_expiry_days {
            return Err(InvitationError::InvalidExpiry(format!(
                "expiration may not exceed {} days",
                self.policy.max_expiry_days
            )));
        }

        let now = Utc::now();
        let expires_at = calculate_expiration(now, days);
        validate_future_timestamp(expires_at, now).map_err(|_| {
            InvitationError::InvalidExpiry("expiration must be in the future".to_string())
        })?;

        let email = normalize_email(&request.email);
        let token = self.generate_unique_token().await?;

        let mut tx = self.store.begin().await?;
        let invitation = match insert_if_no_active(
            &mut tx,
            NewInvitation {
                group_id,
                email,
                token,
                expires_at,
            },
        )
        .await
        {
            Ok(invitation) => invitation,
            Err(e) => {
                rollback_quietly(tx).await;
                return Err(e);
            }
        };
        tx.commit().await?;

        let mut enrichment = self.store.enrichment(&invitation).await?;
        enrichment.message = request.message;

        info!(
            invitation_id = %invitation.id,
            group_id = %group_id,
            expires_at = %invitation.expires_at,
            "Invitation issued"
        );
        Ok(GroupInvitationWithDetails::assemble(invitation, enrichment))
    }

    /// Look up an invitation by token with its current status.
    pub async fn lookup(&self, token: &str) -> Result<InvitationResponse, InvitationError> {
        let invitation = self
            .store
            .find_by_token(token)
            .await?
            .ok_or(InvitationError::NotFound)?;
        let status = invitation.status_at(Utc::now());
        let enrichment = self.store.enrichment(&invitation).await?;

        Ok(InvitationResponse {
            invitation: GroupInvitationWithDetails::assemble(invitation, enrichment),
            status,
        })
    }

    /// Pending invitations of a group with display data.
    pub async fn list_pending(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<GroupInvitationWithDetails>, InvitationError> {
        let rows = self.store.list_pending(group_id).await?;
        Ok(rows
            .into_iter()
            .map(|(invitation, enrichment)| {
                GroupInvitationWithDetails::assemble(invitation, enrichment)
            })
            .collect())
    }

    /// Redeem an invitation for `user_id`, adding them to the group as a member.
    pub async fn accept(
        &self,
        token: &str,
        user_id: Uuid,
    ) -> Result<AcceptInvitationResponse, InvitationError> {
        let invitation = self
            .store
            .find_by_token(token)
            .await?
            .ok_or(InvitationError::NotFound)?;

        match invitation.status_at(Utc::now()) {
            InvitationStatus::Used => return Err(InvitationError::AlreadyUsed),
            InvitationStatus::Expired => return Err(InvitationError::Expired),
            InvitationStatus::Pending => {}
        }

        let mut tx = self.store.begin().await?;

        let marked = match tx.mark_used(invitation.id).await {
            Ok(marked) => marked,
            Err(e) => {
                rollback_quietly(tx).await;
                return Err(e.into());
            }
        };
        if !marked {
            rollback_quietly(tx).await;
            // Either redeemed concurrently or expired since the first read.
            let current = self.store.find_by_token(token).await?;
            let expired = current
                .map(|i| i.status_at(Utc::now()) == InvitationStatus::Expired)
                .unwrap_or(false);
            warn!(
                invitation_id = %invitation.id,
                expired,
                "Invitation no longer redeemable"
            );
            return Err(if expired {
                InvitationError::Expired
            } else {
                InvitationError::AlreadyUsed
            });
        }

        let added = match tx
            .add_member(invitation.group_id, user_id, GroupRole::Member)
            .await
        {
            Ok(added) => added,
            Err(e) => {
                rollback_quietly(tx).await;
                return Err(e.into());
            }
        };

        tx.commit().await?;

        info!(
            invitation_id = %invitation.id,
            group_id = %invitation.group_id,
            user_id = %user_id,
            already_member = !added,
            "Invitation accepted"
        );
        Ok(AcceptInvitationResponse {
            group_id: invitation.group_id,
            user_id,
            already_member: !added,
        })
    }

    async fn generate_unique_token(&self) -> Result<String, InvitationError> {
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = generate_invitation_token();
            if !self.store.token_exists(&token).await? {
                return Ok(token);
            }
        }
        Err(InvitationError::TokenExhausted)
    }
}

/// Insert `invitation` unless the invitee already holds an active one.
async fn insert_if_no_active<T: InvitationTransaction>(
    tx: &mut T,
    invitation: NewInvitation,
) -> Result<GroupInvitation, InvitationError> {
    tx.lock_invitee(invitation.group_id, &invitation.email).await?;
    if tx
        .find_active_for_email(invitation.group_id, &invitation.email)
        .await?
        .is_some()
    {
        return Err(InvitationError::ActiveInvitationExists);
    }
    Ok(tx.insert_invitation(&invitation).await?)
}

async fn rollback_quietly<T: InvitationTransaction>(tx: T) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "Failed to roll back invitation transaction");
    }
}
