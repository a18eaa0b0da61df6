//! Group entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::group::GroupRole;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for group_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "group_role", rename_all = "lowercase")]
pub enum GroupRoleDb {
    Admin,
    Member,
}

impl From<GroupRoleDb> for GroupRole {
    fn from(db_role: GroupRoleDb) -> Self {
        match db_role {
            GroupRoleDb::Admin => GroupRole::Admin,
            GroupRoleDb::Member => GroupRole::Member,
        }
    }
}

impl From<GroupRole> for GroupRoleDb {
    fn from(role: GroupRole) -> Self {
        match role {
            GroupRole::Admin => GroupRoleDb::Admin,
            GroupRole::Member => GroupRoleDb::Member,
        }
    }
}

/// Database row mapping for the groups table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_private: bool,
    pub requires_admin_approval: bool,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupEntity> for domain::models::Group {
    fn from(entity: GroupEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            image_url: entity.image_url,
            is_private: entity.is_private,
            requires_admin_approval: entity.requires_admin_approval,
            creator_id: entity.creator_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the group_memberships table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupMembershipEntity {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRoleDb,
    pub joined_at: DateTime<Utc>,
}

impl From<GroupMembershipEntity> for domain::models::GroupMembership {
    fn from(entity: GroupMembershipEntity) -> Self {
        Self {
            group_id: entity.group_id,
            user_id: entity.user_id,
            role: entity.role.into(),
            joined_at: entity.joined_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_role_db_round_trip() {
        for role in [GroupRole::Admin, GroupRole::Member] {
            let db: GroupRoleDb = role.into();
            assert_eq!(GroupRole::from(db), role);
        }
    }

    #[test]
    fn test_group_entity_into_domain() {
        let now = Utc::now();
        let entity = GroupEntity {
            id: Uuid::new_v4(),
            name: "Runners".to_string(),
            description: Some("Sunday long runs".to_string()),
            image_url: None,
            is_private: true,
            requires_admin_approval: false,
            creator_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };
        let group: domain::models::Group = entity.clone().into();
        assert_eq!(group.id, entity.id);
        assert_eq!(group.description.as_deref(), Some("Sunday long runs"));
        assert!(group.is_private);
        assert!(!group.requires_admin_approval);
    }
}
