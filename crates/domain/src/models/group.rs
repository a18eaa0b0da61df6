//! Group domain models and the field normalization rules applied to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// Maximum group name length in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum group description length in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Maximum image URL length in characters.
pub const MAX_IMAGE_URL_LENGTH: usize = 2048;

/// Client-side spelling of the privacy flag.
pub const IS_PRIVATE_CLIENT_KEY: &str = "isPrivate";

/// Storage column for the privacy flag.
pub const IS_PRIVATE_KEY: &str = "is_private";

/// Storage column for the admin approval flag.
pub const REQUIRES_ADMIN_APPROVAL_KEY: &str = "requires_admin_approval";

/// Role within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Admin,
    Member,
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Admin => "admin",
            GroupRole::Member => "member",
        }
    }

    /// Returns true if this role can change group settings.
    pub fn can_manage_group(&self) -> bool {
        matches!(self, GroupRole::Admin)
    }

    /// Returns true if this role can issue and list invitations.
    pub fn can_invite(&self) -> bool {
        matches!(self, GroupRole::Admin)
    }
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Group {
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

/// A user's membership in a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupMembership {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

/// Request payload for creating a group.
///
/// `requires_admin_approval` is tri-state: absent means "use the default".
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateGroupRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[serde(alias = "image")]
    #[validate(length(max = 2048, message = "Image URL must be at most 2048 characters"))]
    pub image_url: Option<String>,

    #[serde(alias = "isPrivate")]
    pub is_private: Option<bool>,

    #[serde(alias = "requiresAdminApproval")]
    pub requires_admin_approval: Option<bool>,
}

/// A group ready to be inserted, with every default already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_private: bool,
    pub requires_admin_approval: bool,
    pub creator_id: Uuid,
}

/// Response for group detail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: Group,
    pub your_role: GroupRole,
}

/// Resolves the admin approval flag of a new group.
///
/// Approval is required unless the caller explicitly opted out.
pub fn resolve_admin_approval(requested: Option<bool>) -> bool {
    !matches!(requested, Some(false))
}

/// Loosely-typed partial update as received from a client.
pub type UpdateFields = serde_json::Map<String, Value>;

/// Rewrites client keys of an update mapping to their storage spelling.
///
/// `isPrivate` is moved to `is_private`. A boolean `requires_admin_approval`
/// is kept as the same boolean; any other value for it is left untouched and
/// rejected later by [`GroupPatch::try_from`]. All other keys pass through.
pub fn normalize_update_fields(fields: &mut UpdateFields) {
    if let Some(value) = fields.remove(IS_PRIVATE_CLIENT_KEY) {
        fields.insert(IS_PRIVATE_KEY.to_string(), value);
    }

    if let Some(flag) = fields
        .get(REQUIRES_ADMIN_APPROVAL_KEY)
        .and_then(Value::as_bool)
    {
        fields.insert(REQUIRES_ADMIN_APPROVAL_KEY.to_string(), Value::Bool(flag));
    }
}

/// Error raised when an update mapping does not fit the group columns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupPatchError {
    #[error("No updatable fields supplied")]
    Empty,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field '{field}' must be {expected}")]
    InvalidType {
        field: String,
        expected: &'static str,
    },

    #[error("Field '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Typed partial update of a group.
///
/// `None` means "leave the column alone". For nullable columns the inner
/// option distinguishes "set to null" from "set to a value".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub is_private: Option<bool>,
    pub requires_admin_approval: Option<bool>,
}

impl GroupPatch {
    /// Returns true if no column is assigned.
    pub fn is_empty(&self) -> bool {
        self.assigned_columns().is_empty()
    }

    /// Storage columns this patch writes, in a stable order.
    pub fn assigned_columns(&self) -> Vec<&'static str> {
        let mut columns = Vec::new();
        if self.name.is_some() {
            columns.push("name");
        }
        if self.description.is_some() {
            columns.push("description");
        }
        if self.image_url.is_some() {
            columns.push("image_url");
        }
        if self.is_private.is_some() {
            columns.push(IS_PRIVATE_KEY);
        }
        if self.requires_admin_approval.is_some() {
            columns.push(REQUIRES_ADMIN_APPROVAL_KEY);
        }
        columns
    }
}

impl TryFrom<UpdateFields> for GroupPatch {
    type Error = GroupPatchError;

    fn try_from(fields: UpdateFields) -> Result<Self, Self::Error> {
        let mut patch = GroupPatch::default();

        for (key, value) in fields {
            match key.as_str() {
                "name" => {
                    let name = expect_string(&key, value)?;
                    check_length(&key, &name, 1, MAX_NAME_LENGTH)?;
                    if name.trim().is_empty() {
                        return Err(GroupPatchError::InvalidValue {
                            field: key,
                            message: "must not be blank".to_string(),
                        });
                    }
                    patch.name = Some(name);
                }
                "description" => {
                    let description = expect_nullable_string(&key, value)?;
                    if let Some(ref text) = description {
                        check_length(&key, text, 0, MAX_DESCRIPTION_LENGTH)?;
                    }
                    patch.description = Some(description);
                }
                "image_url" => {
                    let image_url = expect_nullable_string(&key, value)?;
                    if let Some(ref url) = image_url {
                        check_length(&key, url, 0, MAX_IMAGE_URL_LENGTH)?;
                    }
                    patch.image_url = Some(image_url);
                }
                IS_PRIVATE_KEY => patch.is_private = Some(expect_bool(&key, &value)?),
                REQUIRES_ADMIN_APPROVAL_KEY => {
                    patch.requires_admin_approval = Some(expect_bool(&key, &value)?)
                }
                _ => return Err(GroupPatchError::UnknownField(key)),
            }
        }

        if patch.is_empty() {
            return Err(GroupPatchError::Empty);
        }
        Ok(patch)
    }
}

fn expect_bool(field: &str, value: &Value) -> Result<bool, GroupPatchError> {
    value.as_bool().ok_or_else(|| GroupPatchError::InvalidType {
        field: field.to_string(),
        expected: "a boolean",
    })
}

fn expect_string(field: &str, value: Value) -> Result<String, GroupPatchError> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(GroupPatchError::InvalidType {
            field: field.to_string(),
            expected: "a string",
        }),
    }
}

fn expect_nullable_string(field: &str, value: Value) -> Result<Option<String>, GroupPatchError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        _ => Err(GroupPatchError::InvalidType {
            field: field.to_string(),
            expected: "a string or null",
        }),
    }
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), GroupPatchError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(GroupPatchError::InvalidValue {
            field: field.to_string(),
            message: format!("length must be between {} and {} characters", min, max),
        });
    }
    Ok(())
}
