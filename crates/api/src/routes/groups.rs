//! Group routes: creation, lookup and partial update.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::group::{CreateGroupRequest, GroupDetail, GroupRole, UpdateFields};
use domain::models::GroupMembership;
use domain::services::GroupService;
use persistence::repositories::GroupRepository;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ActingUser;
use crate::middleware::metrics::record_group_created;

/// Create a new group.
///
/// POST /api/v1/groups
///
/// The creator becomes the group's first admin. Admin approval for joining
/// is required unless the body sets `requires_admin_approval` to `false`.
pub async fn create_group(
    State(state): State<AppState>,
    user: ActingUser,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupDetail>), ApiError> {
    request.validate()?;

    let service = GroupService::new(GroupRepository::new(state.pool.clone()));
    let group = service.create_group(request, user.user_id).await?;

    record_group_created(group.requires_admin_approval);

    Ok((
        StatusCode::CREATED,
        Json(GroupDetail {
            group,
            your_role: GroupRole::Admin,
        }),
    ))
}

/// Get group details.
///
/// GET /api/v1/groups/:group_id
///
/// The caller must be a member of the group.
pub async fn get_group(
    State(state): State<AppState>,
    user: ActingUser,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupDetail>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());
    let membership = require_membership(&repo, group_id, user.user_id).await?;

    let group = repo
        .find_by_id(group_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;

    info!(
        group_id = %group_id,
        user_id = %user.user_id,
        role = %membership.role,
        "Retrieved group details"
    );

    Ok(Json(GroupDetail {
        group,
        your_role: membership.role,
    }))
}

/// Update some fields of a group.
///
/// PATCH /api/v1/groups/:group_id (also mounted on PUT)
///
/// The body is a loose JSON object. `isPrivate` is accepted as an alias of
/// `is_private`; only the supplied columns are written. Admins only.
pub async fn update_group(
    State(state): State<AppState>,
    user: ActingUser,
    Path(group_id): Path<Uuid>,
    Json(fields): Json<UpdateFields>,
) -> Result<Json<GroupDetail>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());
    let membership = require_membership(&repo, group_id, user.user_id).await?;
    if !membership.role.can_manage_group() {
        return Err(ApiError::Forbidden(
            "Only group admins can update the group".to_string(),
        ));
    }

    let service = GroupService::new(repo);
    let group = service.update_group_fields(group_id, fields).await?;

    Ok(Json(GroupDetail {
        group,
        your_role: membership.role,
    }))
}

/// Loads the caller's membership. Non-members get the same 404 as a missing
/// group so group ids cannot be discovered.
pub(crate) async fn require_membership(
    repo: &GroupRepository,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<GroupMembership, ApiError> {
    repo.get_membership(group_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))
}

/// Loads the caller's membership and requires invite rights.
pub(crate) async fn require_admin(
    repo: &GroupRepository,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<GroupMembership, ApiError> {
    let membership = require_membership(repo, group_id, user_id).await?;
    if membership.role.can_invite() {
        Ok(membership)
    } else {
        Err(ApiError::Forbidden(
            "Only group admins can manage invitations".to_string(),
        ))
    }
}
