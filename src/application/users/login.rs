use crate::application::users::{UserCredentials, UserLogged, UserView};
use crate::domain::auth::AuthService;
use crate::domain::base::Repository;
use crate::domain::filter::Filter;
use crate::domain::password::PasswordHashingService;
use crate::domain::users::User;
use crate::shared::error::AppError;
use std::sync::Arc;

pub struct LoginUseCase {
    repo: Arc<dyn Repository<User>>,
    auth_service: Arc<dyn AuthService>,
    password_service: Arc<dyn PasswordHashingService>,
}

impl LoginUseCase {
    pub fn new(
        repo: Arc<dyn Repository<User>>,
        auth_service: Arc<dyn AuthService>,
        password_service: Arc<dyn PasswordHashingService>,
    ) -> Self {
        Self {
            repo,
            auth_service,
            password_service,
        }
    }

    #[tracing::instrument(skip(self, req), fields(username = %req.username))]
    pub async fn execute(&self, req: UserCredentials) -> Result<UserLogged, AppError> {
        let username = req.username.trim().to_lowercase();

        let user = self
            .repo
            .find_one(&Filter::new().eq("username", username))
            .await?
            .ok_or_else(|| AppError::NotFound("Invalid username".to_string()))?;

        let password_service = self.password_service.clone();
        let hash = user.password.clone();
        let valid_password = tokio::task::spawn_blocking(move || {
            password_service.verify_password(&req.password, &hash)
        })
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?
        .map_err(AppError::InternalServerError)?;

        if !valid_password {
            return Err(AppError::BadRequest("Invalid password".to_string()));
        }

        if !user.confirmed {
            return Err(AppError::BadRequest(
                "User need to be confirmated".to_string(),
            ));
        }

        let token = self
            .auth_service
            .generate_session_token(&user)
            .map_err(AppError::InternalServerError)?;

        Ok(UserLogged {
            token,
            user: UserView::from(&user),
        })
    }
}
