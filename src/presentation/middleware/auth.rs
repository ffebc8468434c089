use crate::application::users::validate::ValidateUseCase;
use crate::infrastructure::state::AppState;
use crate::presentation::extractors::AuthUser;
use crate::shared::error::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// State of the bearer guard placed in front of protected routes
#[derive(Clone)]
pub struct AuthGuard {
    validate: Arc<ValidateUseCase>,
}

impl AuthGuard {
    pub fn new(state: &AppState) -> Self {
        Self {
            validate: Arc::new(ValidateUseCase::new(
                state.users.clone(),
                state.auth_service.clone(),
            )),
        }
    }
}

/// Token carried by an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header format".to_string()))
}

/// Resolve the bearer token to a user and hand it to the handler as an [`AuthUser`].
pub async fn require_auth(
    State(guard): State<AuthGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?.to_owned();

    let (claims, user) = guard.validate.execute(&token).await.inspect_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
    })?;

    request.extensions_mut().insert(AuthUser { claims, user });
    Ok(next.run(request).await)
}
