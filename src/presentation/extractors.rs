use crate::domain::auth::Claims;
use crate::domain::users::User;
use crate::shared::error::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Authenticated user of a request.
/// Only available behind [`crate::presentation::middleware::auth::require_auth`], which validates the token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
    pub user: User,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))
    }
}
