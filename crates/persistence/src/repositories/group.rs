//! Group repository for database operations.

use domain::models::group::{GroupPatch, GroupRole, NewGroup};
use domain::models::{Group, GroupMembership};
use domain::services::{GroupStore, GroupTransaction};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::entities::{GroupEntity, GroupMembershipEntity, GroupRoleDb};
use crate::metrics::QueryTimer;

const GROUP_COLUMNS: &str = "id, name, description, image_url, is_private, \
    requires_admin_approval, creator_id, created_at, updated_at";

/// Repository for group-related database operations.
#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Creates a new GroupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a group by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_by_id");
        let result = sqlx::query_as::<_, GroupEntity>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    /// Get a user's membership in a group.
    pub async fn get_membership(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupMembership>, sqlx::Error> {
        let timer = QueryTimer::new("get_group_membership");
        let result = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            SELECT group_id, user_id, role, joined_at
            FROM group_memberships
            WHERE group_id = $1 AND user_id = $2
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?.map(Into::into))
    }
}

#[async_trait::async_trait]
impl GroupStore for GroupRepository {
    type Tx = PgGroupTransaction;

    async fn begin(&self) -> Result<PgGroupTransaction, sqlx::Error> {
        Ok(PgGroupTransaction {
            tx: self.pool.begin().await?,
        })
    }
}

/// Group writes sharing one database transaction.
pub struct PgGroupTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait::async_trait]
impl GroupTransaction for PgGroupTransaction {
    async fn insert_group(&mut self, group: &NewGroup) -> Result<Group, sqlx::Error> {
        let timer = QueryTimer::new("insert_group");
        let result = sqlx::query_as::<_, GroupEntity>(&format!(
            r#"
            INSERT INTO groups (name, description, image_url, is_private, requires_admin_approval, creator_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(&group.name)
        .bind(&group.description)
        .bind(&group.image_url)
        .bind(group.is_private)
        .bind(group.requires_admin_approval)
        .bind(group.creator_id)
        .fetch_one(&mut *self.tx)
        .await;
        timer.record();
        Ok(result?.into())
    }

    async fn add_member(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
        role: GroupRole,
    ) -> Result<bool, sqlx::Error> {
        insert_membership(&mut *self.tx, group_id, user_id, role).await
    }

    async fn update_group(
        &mut self,
        group_id: Uuid,
        patch: &GroupPatch,
    ) -> Result<Option<Group>, sqlx::Error> {
        let timer = QueryTimer::new("update_group");

        let mut query = QueryBuilder::<Postgres>::new("UPDATE groups SET ");
        let mut assignments = query.separated(", ");
        if let Some(name) = &patch.name {
            assignments.push("name = ");
            assignments.push_bind_unseparated(name.clone());
        }
        if let Some(description) = &patch.description {
            assignments.push("description = ");
            assignments.push_bind_unseparated(description.clone());
        }
        if let Some(image_url) = &patch.image_url {
            assignments.push("image_url = ");
            assignments.push_bind_unseparated(image_url.clone());
        }
        if let Some(is_private) = patch.is_private {
            assignments.push("is_private = ");
            assignments.push_bind_unseparated(is_private);
        }
        if let Some(requires_admin_approval) = patch.requires_admin_approval {
            assignments.push("requires_admin_approval = ");
            assignments.push_bind_unseparated(requires_admin_approval);
        }
        assignments.push("updated_at = NOW()");

        query.push(" WHERE id = ");
        query.push_bind(group_id);
        query.push(" RETURNING ");
        query.push(GROUP_COLUMNS);

        let result = query
            .build_query_as::<GroupEntity>()
            .fetch_optional(&mut *self.tx)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }

    async fn rollback(self) -> Result<(), sqlx::Error> {
        self.tx.rollback().await
    }
}

/// Insert a membership row. Returns false if the user was already a member.
pub(crate) async fn insert_membership(
    conn: &mut PgConnection,
    group_id: Uuid,
    user_id: Uuid,
    role: GroupRole,
) -> Result<bool, sqlx::Error> {
    let timer = QueryTimer::new("add_group_member");
    let role_db: GroupRoleDb = role.into();
    let result = sqlx::query(
        r#"
        INSERT INTO group_memberships (group_id, user_id, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (group_id, user_id) DO NOTHING
        "#,
    )
    .bind(group_id)
    .bind(user_id)
    .bind(role_db)
    .execute(conn)
    .await;
    timer.record();
    Ok(result?.rows_affected() == 1)
}
