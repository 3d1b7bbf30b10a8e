//! Request identity.
//!
//! Sign-in happens upstream. The gateway forwards the authenticated user in
//! [`USER_ID_HEADER`]; admin calls carry `Authorization: Bearer <token>`.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;
use uuid::Uuid;

use crate::{error::StoreError, AppState};

pub const USER_ID_HEADER: &str = "x-user-id";

/// The signed-in shopper.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = StoreError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(CurrentUser)
            .ok_or(StoreError::Unauthenticated)
    }
}

/// Proof that the caller presented the admin token.
#[derive(Clone, Copy, Debug)]
pub struct AdminAccess;

#[async_trait]
impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = StoreError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(StoreError::Unauthenticated)?;

        if !state.is_admin_token(token) {
            warn!(path = %parts.uri.path(), "rejected admin token");
            return Err(StoreError::Forbidden);
        }
        Ok(AdminAccess)
    }
}
