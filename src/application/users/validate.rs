use crate::domain::auth::{AuthService, Claims};
use crate::domain::base::Repository;
use crate::domain::users::User;
use crate::shared::error::AppError;
use std::sync::Arc;

/// Resolves a bearer token to the user it was issued for.
pub struct ValidateUseCase {
    repo: Arc<dyn Repository<User>>,
    auth_service: Arc<dyn AuthService>,
}

impl ValidateUseCase {
    pub fn new(repo: Arc<dyn Repository<User>>, auth_service: Arc<dyn AuthService>) -> Self {
        Self { repo, auth_service }
    }

    #[tracing::instrument(skip(self, token))]
    pub async fn execute(&self, token: &str) -> Result<(Claims, User), AppError> {
        let claims = self
            .auth_service
            .validate_session_token(token)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        let user_id = claims
            .user_id()
            .map_err(|e| AppError::Unauthorized(e.to_string()))?;

        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

        Ok((claims, user))
    }
}
