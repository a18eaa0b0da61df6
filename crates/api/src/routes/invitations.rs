//! Group invitation routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::invitation::{
    AcceptInvitationResponse, CreateInvitationRequest, GroupInvitationWithDetails,
    InvitationResponse, ListInvitationsResponse,
};
use domain::services::{InvitationPolicy, InvitationService};
use persistence::repositories::{GroupRepository, InvitationRepository};
use shared::crypto::is_well_formed_token;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ActingUser;
use crate::middleware::metrics::record_invitation_event;
use crate::routes::groups::require_admin;

fn invitation_service(state: &AppState) -> InvitationService<InvitationRepository> {
    let policy: InvitationPolicy = (&state.config.invitations).into();
    InvitationService::new(InvitationRepository::new(state.pool.clone()), policy)
}

fn check_token(token: &str) -> Result<(), ApiError> {
    if is_well_formed_token(token) {
        Ok(())
    } else {
        Err(ApiError::NotFound("Invitation not found".to_string()))
    }
}

/// Invite someone to a group by email.
///
/// POST /api/v1/groups/:group_id/invitations
///
/// Admins only. Fails with 409 while an earlier invitation for the same
/// address is still pending.
pub async fn create_invitation(
    State(state): State<AppState>,
    user: ActingUser,
    Path(group_id): Path<Uuid>,
    Json(request): Json<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<GroupInvitationWithDetails>), ApiError> {
    request.validate()?;

    let groups = GroupRepository::new(state.pool.clone());
    require_admin(&groups, group_id, user.user_id).await?;

    let invitation = invitation_service(&state).issue(group_id, request).await?;

    record_invitation_event("issued");
    info!(
        group_id = %group_id,
        invitation_id = %invitation.id,
        inviter_id = %user.user_id,
        "Group invitation created"
    );

    Ok((StatusCode::CREATED, Json(invitation)))
}

/// List pending invitations of a group.
///
/// GET /api/v1/groups/:group_id/invitations
///
/// Admins only.
pub async fn list_invitations(
    State(state): State<AppState>,
    user: ActingUser,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ListInvitationsResponse>, ApiError> {
    let groups = GroupRepository::new(state.pool.clone());
    require_admin(&groups, group_id, user.user_id).await?;

    let data = invitation_service(&state).list_pending(group_id).await?;
    let count = data.len();

    info!(group_id = %group_id, count, "Listed group invitations");

    Ok(Json(ListInvitationsResponse { data, count }))
}

/// Look up an invitation by its token.
///
/// GET /api/v1/invitations/:token
///
/// The token itself is the credential; no membership is required.
pub async fn get_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<InvitationResponse>, ApiError> {
    check_token(&token)?;
    let response = invitation_service(&state).lookup(&token).await?;
    Ok(Json(response))
}

/// Accept an invitation and join its group as a member.
///
/// POST /api/v1/invitations/:token/accept
pub async fn accept_invitation(
    State(state): State<AppState>,
    user: ActingUser,
    Path(token): Path<String>,
) -> Result<Json<AcceptInvitationResponse>, ApiError> {
    check_token(&token)?;
    let response = invitation_service(&state)
        .accept(&token, user.user_id)
        .await?;

    record_invitation_event("accepted");
    info!(
        group_id = %response.group_id,
        user_id = %user.user_id,
        already_member = response.already_member,
        "Group invitation accepted"
    );

    Ok(Json(response))
}
