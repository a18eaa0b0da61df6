//! Group invitation repository for database operations.

use domain::models::group::GroupRole;
use domain::models::invitation::{GroupInvitation, InvitationEnrichment, NewInvitation};
use domain::services::{InvitationStore, InvitationTransaction};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::group::insert_membership;
use crate::entities::{
    GroupInvitationEntity, InvitationEnrichmentEntity, InvitationWithDetailsEntity,
};
use crate::metrics::QueryTimer;

/// Repository for group invitation database operations.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    /// Creates a new InvitationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InvitationStore for InvitationRepository {
    type Tx = PgInvitationTransaction;

    async fn begin(&self) -> Result<PgInvitationTransaction, sqlx::Error> {
        Ok(PgInvitationTransaction {
            tx: self.pool.begin().await?,
        })
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<GroupInvitation>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_invitation_by_token");
        let result = sqlx::query_as::<_, GroupInvitationEntity>(
            r#"
            SELECT id, group_id, email, token, expires_at, created_at, used
            FROM group_invitations
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    async fn token_exists(&self, token: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("group_invitation_token_exists");
        let result: Result<(bool,), sqlx::Error> = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM group_invitations WHERE token = $1)",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result?.0)
    }

    async fn enrichment(
        &self,
        invitation: &GroupInvitation,
    ) -> Result<InvitationEnrichment, sqlx::Error> {
        let timer = QueryTimer::new("group_invitation_enrichment");
        let result = sqlx::query_as::<_, InvitationEnrichmentEntity>(
            r#"
            SELECT
                (SELECT u.id FROM users u WHERE lower(u.email) = lower($2) LIMIT 1) AS user_id,
                g.name AS group_name,
                g.image_url AS group_image,
                c.display_name AS inviter_name,
                c.email AS inviter_email
            FROM groups g
            LEFT JOIN users c ON c.id = g.creator_id
            WHERE g.id = $1
            "#,
        )
        .bind(invitation.group_id)
        .bind(&invitation.email)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result?.into())
    }

    async fn list_pending(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<(GroupInvitation, InvitationEnrichment)>, sqlx::Error> {
        let timer = QueryTimer::new("list_pending_group_invitations");
        let result = sqlx::query_as::<_, InvitationWithDetailsEntity>(
            r#"
            SELECT
                i.id, i.group_id, i.email, i.token, i.expires_at, i.created_at, i.used,
                (SELECT u.id FROM users u WHERE lower(u.email) = lower(i.email) LIMIT 1) AS user_id,
                g.name AS group_name,
                g.image_url AS group_image,
                c.display_name AS inviter_name,
                c.email AS inviter_email
            FROM group_invitations i
            JOIN groups g ON g.id = i.group_id
            LEFT JOIN users c ON c.id = g.creator_id
            WHERE i.group_id = $1 AND i.used = false AND i.expires_at > NOW()
            ORDER BY i.created_at DESC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result?.into_iter().map(Into::into).collect())
    }
}

/// Invitation writes sharing one database transaction.
pub struct PgInvitationTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait::async_trait]
impl InvitationTransaction for PgInvitationTransaction {
    async fn lock_invitee(&mut self, group_id: Uuid, email: &str) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("lock_group_invitee");
        let result = sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text || lower($2)))")
            .bind(group_id)
            .bind(email)
            .execute(&mut *self.tx)
            .await;
        timer.record();
        result.map(|_| ())
    }

    async fn find_active_for_email(
        &mut self,
        group_id: Uuid,
        email: &str,
    ) -> Result<Option<GroupInvitation>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_group_invitation");
        let result = sqlx::query_as::<_, GroupInvitationEntity>(
            r#"
            SELECT id, group_id, email, token, expires_at, created_at, used
            FROM group_invitations
            WHERE group_id = $1 AND email = $2 AND used = false AND expires_at > NOW()
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(group_id)
        .bind(email)
        .fetch_optional(&mut *self.tx)
        .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    async fn insert_invitation(
        &mut self,
        invitation: &NewInvitation,
    ) -> Result<GroupInvitation, sqlx::Error> {
        let timer = QueryTimer::new("insert_group_invitation");
        let result = sqlx::query_as::<_, GroupInvitationEntity>(
            r#"
            INSERT INTO group_invitations (group_id, email, token, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, group_id, email, token, expires_at, created_at, used
            "#,
        )
        .bind(invitation.group_id)
        .bind(&invitation.email)
        .bind(&invitation.token)
        .bind(invitation.expires_at)
        .fetch_one(&mut *self.tx)
        .await;
        timer.record();
        Ok(result?.into())
    }

    async fn mark_used(&mut self, invitation_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("mark_group_invitation_used");
        let result = sqlx::query(
            r#"
            UPDATE group_invitations
            SET used = true
            WHERE id = $1 AND used = false AND expires_at > NOW()
            "#,
        )
        .bind(invitation_id)
        .execute(&mut *self.tx)
        .await;
        timer.record();
        Ok(result?.rows_affected() == 1)
    }

    async fn add_member(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
        role: GroupRole,
    ) -> Result<bool, sqlx::Error> {
        insert_membership(&mut *self.tx, group_id, user_id, role).await
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }

    async fn rollback(self) -> Result<(), sqlx::Error> {
        self.tx.rollback().await
    }
}
