use crate::domain::auth::AuthService;
use crate::domain::base::{FieldValue, Repository};
use crate::domain::users::User;
use crate::shared::error::AppError;
use std::sync::Arc;

pub struct ConfirmUseCase {
    repo: Arc<dyn Repository<User>>,
    auth_service: Arc<dyn AuthService>,
}

impl ConfirmUseCase {
    pub fn new(repo: Arc<dyn Repository<User>>, auth_service: Arc<dyn AuthService>) -> Self {
        Self { repo, auth_service }
    }

    #[tracing::instrument(skip(self, token))]
    pub async fn execute(&self, token: &str) -> Result<User, AppError> {
        let claims = self
            .auth_service
            .validate_confirmation_token(token)
            .map_err(|e| {
                tracing::debug!("Rejected confirmation token: {}", e);
                AppError::Forbidden("Invalid or expired confirmation token".to_string())
            })?;

        let user_id = claims
            .user_id()
            .map_err(|e| AppError::Forbidden(e.to_string()))?;

        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if user.confirmed {
            return Err(AppError::BadRequest(
                "User account already confirmated".to_string(),
            ));
        }

        self.repo
            .update(user.id, vec![("confirmed", FieldValue::Bool(true))])
            .await?;

        tracing::info!(user_id = user.id, "user confirmed");

        self.repo
            .find_by_id(user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
