//! Group creation and partial update.
//!
//! Both operations run inside a single storage transaction. Storage errors
//! are surfaced unchanged in [`GroupError::Storage`].

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::group::{
    normalize_update_fields, resolve_admin_approval, CreateGroupRequest, Group, GroupPatch,
    GroupPatchError, GroupRole, NewGroup, UpdateFields,
};

/// Errors produced by [`GroupService`].
#[derive(Debug, Error)]
pub enum GroupError {
    #[error("Group not found")]
    NotFound,

    #[error(transparent)]
    InvalidPatch(#[from] GroupPatchError),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Storage that can open group write transactions.
#[async_trait::async_trait]
pub trait GroupStore: Send + Sync {
    type Tx: GroupTransaction;

    /// Begin a new transaction.
    async fn begin(&self) -> Result<Self::Tx, sqlx::Error>;
}

/// A single group write transaction.
///
/// Dropping a transaction without calling [`commit`](Self::commit) must not
/// persist anything.
#[async_trait::async_trait]
pub trait GroupTransaction: Send {
    /// Insert a group and return the stored row.
    async fn insert_group(&mut self, group: &NewGroup) -> Result<Group, sqlx::Error>;

    /// Add a member. Returns false if the user already belonged to the group.
    async fn add_member(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
        role: GroupRole,
    ) -> Result<bool, sqlx::Error>;

    /// Write the assigned columns of `patch`. Returns `None` if the group does not exist.
    async fn update_group(
        &mut self,
        group_id: Uuid,
        patch: &GroupPatch,
    ) -> Result<Option<Group>, sqlx::Error>;

    async fn commit(self) -> Result<(), sqlx::Error>;

    async fn rollback(self) -> Result<(), sqlx::Error>;
}

/// Group write operations over a [`GroupStore`].
pub struct GroupService<S> {
    store: S,
}

impl<S: GroupStore> GroupService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create a group and add the creator as admin.
    ///
    /// Admin approval defaults to required unless the request explicitly
    /// sets it to false.
    pub async fn create_group(
        &self,
        request: CreateGroupRequest,
        creator_id: Uuid,
    ) -> Result<Group, GroupError> {
        let requires_admin_approval = resolve_admin_approval(request.requires_admin_approval);
        if requires_admin_approval {
            info!(
                requested = ?request.requires_admin_approval,
                "requires_admin_approval not opted out, defaulting to true"
            );
        } else {
            info!("requires_admin_approval explicitly set to false");
        }

        let new_group = NewGroup {
            name: request.name,
            description: request.description,
            image_url: request.image_url,
            is_private: request.is_private.unwrap_or(false),
            requires_admin_approval,
            creator_id,
        };

        let mut tx = self.store.begin().await?;

        let group = match tx.insert_group(&new_group).await {
            Ok(group) => group,
            Err(e) => {
                error!(creator_id = %creator_id, error = %e, "Failed to create group");
                rollback_quietly(tx).await;
                return Err(GroupError::Storage(e));
            }
        };

        if let Err(e) = tx.add_member(group.id, creator_id, GroupRole::Admin).await {
            error!(
                group_id = %group.id,
                creator_id = %creator_id,
                error = %e,
                "Failed to add group creator as admin"
            );
            rollback_quietly(tx).await;
            return Err(GroupError::Storage(e));
        }

        tx.commit().await?;

        info!(
            group_id = %group.id,
            creator_id = %creator_id,
            requires_admin_approval = group.requires_admin_approval,
            "Group created"
        );
        Ok(group)
    }

    /// Apply a loosely-typed partial update to a group.
    ///
    /// Client keys are normalized first (see [`normalize_update_fields`]),
    /// then mapped onto a [`GroupPatch`]; only the supplied columns are written.
    pub async fn update_group_fields(
        &self,
        group_id: Uuid,
        mut fields: UpdateFields,
    ) -> Result<Group, GroupError> {
        normalize_update_fields(&mut fields);
        let patch = GroupPatch::try_from(fields).map_err(|e| {
            warn!(group_id = %group_id, error = %e, "Rejected group update");
            e
        })?;

        let mut tx = self.store.begin().await?;

        let updated = match tx.update_group(group_id, &patch).await {
            Ok(updated) => updated,
            Err(e) => {
                rollback_quietly(tx).await;
                return Err(GroupError::Storage(e));
            }
        };

        let Some(group) = updated else {
            rollback_quietly(tx).await;
            return Err(GroupError::NotFound);
        };

        tx.commit().await?;

        info!(
            group_id = %group_id,
            columns = ?patch.assigned_columns(),
            "Group fields updated"
        );
        Ok(group)
    }
}

async fn rollback_quietly<T: GroupTransaction>(tx: T) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "Failed to roll back group transaction");
    }
}
