use crate::application::base::CreateInput;
use crate::application::users::{UserCreate, prepare_credentials};
use crate::domain::auth::AuthService;
use crate::domain::base::{Repository, RepositoryError};
use crate::domain::mailer::{Email, Mailer};
use crate::domain::password::PasswordHashingService;
use crate::domain::users::User;
use crate::shared::error::AppError;
use std::sync::Arc;

pub const CONFIRMATION_SUBJECT: &str = "Confirm your account";

pub fn confirmation_link(public_url: &str, token: &str) -> String {
    format!("{}/api/user/confirm/{}", public_url.trim_end_matches('/'), token)
}

fn confirmation_html(link: &str) -> String {
    format!(
        "<div><p>Welcome!</p><p>Please confirm your account by following this link:</p>\
         <p><a href=\"{link}\">{link}</a></p></div>"
    )
}

pub struct RegisterUseCase {
    repo: Arc<dyn Repository<User>>,
    password_hasher: Arc<dyn PasswordHashingService>,
    auth_service: Arc<dyn AuthService>,
    mailer: Arc<dyn Mailer>,
    public_url: String,
}

impl RegisterUseCase {
    pub fn new(
        repo: Arc<dyn Repository<User>>,
        password_hasher: Arc<dyn PasswordHashingService>,
        auth_service: Arc<dyn AuthService>,
        mailer: Arc<dyn Mailer>,
        public_url: String,
    ) -> Self {
        Self {
            repo,
            password_hasher,
            auth_service,
            mailer,
            public_url,
        }
    }

    #[tracing::instrument(skip(self, req), fields(username = %req.username))]
    pub async fn execute(&self, mut req: UserCreate) -> Result<User, AppError> {
        prepare_credentials(&self.repo, &self.password_hasher, &mut req).await?;

        // The unique index still decides when two registrations race past the lookup above
        let user = self
            .repo
            .create(req.fields())
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    AppError::BadRequest(format!("{} exist", req.username))
                }
                other => other.into(),
            })?;

        // Unconfirmable without the email, so the username is released again
        if let Err(e) = self.send_confirmation(&user).await {
            tracing::error!("Failed to send confirmation email: {:?}", e);
            if let Err(cleanup) = self.repo.delete(user.id).await {
                tracing::error!(user_id = user.id, "Failed to remove unconfirmable user: {:?}", cleanup);
            }
            return Err(AppError::InternalServerError(e));
        }

        tracing::info!(user_id = user.id, "user registered");
        Ok(user)
    }

    async fn send_confirmation(&self, user: &User) -> anyhow::Result<()> {
        let token = self.auth_service.generate_confirmation_token(user)?;
        let link = confirmation_link(&self.public_url, &token);

        self.mailer
            .send(Email {
                to: user.username.clone(),
                subject: CONFIRMATION_SUBJECT.to_string(),
                html: confirmation_html(&link),
            })
            .await
    }
}
