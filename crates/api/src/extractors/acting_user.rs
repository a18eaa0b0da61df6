//! Acting user extractor.
//!
//! The gateway in front of this service authenticates callers and forwards
//! the user's id in the `X-User-Id` header.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// The user on whose behalf the request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser {
    pub user_id: Uuid,
}

impl ActingUser {
    /// Parses the header value into an acting user.
    pub fn parse(value: Option<&str>) -> Result<Self, ApiError> {
        let raw = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Missing user identity".to_string()))?;

        let user_id = Uuid::parse_str(raw)
            .map_err(|_| ApiError::Unauthorized("Invalid user identity".to_string()))?;

        Ok(ActingUser { user_id })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok());
        Self::parse(value)
    }
}
