pub mod confirm;
pub mod login;
pub mod register;
pub mod validate;

use crate::application::base::{CreateInput, UpdateInput};
use crate::domain::base::{FieldValue, Fields, Repository};
use crate::domain::filter::Filter;
use crate::domain::password::PasswordHashingService;
use crate::domain::users::User;
use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub const PASSWORD_RULE: &str = "Minimum 6 characters, with at least two of: uppercase letter, lowercase letter, number";

/// At least 6 characters drawn from at least two of the lowercase, uppercase and digit classes.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let classes = [
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
    ];
    let strong = password.chars().count() >= 6 && classes.iter().filter(|c| **c).count() >= 2;

    if strong {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength").with_message(PASSWORD_RULE.into()))
    }
}

/// User as returned by the API; the password hash is never part of it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = UserVM)]
pub struct UserView {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "john@example.com")]
    pub username: String,
    pub confirmed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            confirmed: user.confirmed,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(as = UserCreateVM)]
pub struct UserCreate {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "john@example.com")]
    pub username: String,
    #[validate(custom(function = "validate_password_strength"))]
    #[schema(example = "Abcdef1", min_length = 6)]
    pub password: String,
}

impl CreateInput for UserCreate {
    fn fields(&self) -> Fields {
        vec![
            ("username", FieldValue::from(self.username.as_str())),
            ("password", FieldValue::from(self.password.as_str())),
        ]
    }
}

/// Only the username can change here; `confirmed` is owned by the confirmation flow
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(as = UserUpdateVM)]
pub struct UserUpdate {
    #[schema(example = 1)]
    pub id: Option<i64>,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "john@example.com")]
    pub username: Option<String>,
}

impl UpdateInput for UserUpdate {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn fields(&self) -> Fields {
        self.username
            .iter()
            .map(|username| ("username", FieldValue::from(username.as_str())))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(as = UserCredentialsVM)]
pub struct UserCredentials {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "john@example.com")]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "Abcdef1")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(as = UserLogedVM)]
pub struct UserLogged {
    pub token: String,
    pub user: UserView,
}

/// Reject a username already held by another user. `except` is the id of the user being updated.
pub async fn ensure_username_free(
    repo: &Arc<dyn Repository<User>>,
    username: &str,
    except: Option<i64>,
) -> Result<(), AppError> {
    let existing = repo
        .find_one(&Filter::new().eq("username", username))
        .await?;

    match existing {
        Some(user) if Some(user.id) != except => {
            Err(AppError::BadRequest(format!("{} exist", username)))
        }
        _ => Ok(()),
    }
}

/// Normalize the username, check it is free and replace the plain password with its hash.
#[tracing::instrument(skip(repo, hasher, input), fields(username = %input.username))]
pub async fn prepare_credentials(
    repo: &Arc<dyn Repository<User>>,
    hasher: &Arc<dyn PasswordHashingService>,
    input: &mut UserCreate,
) -> Result<(), AppError> {
    input.username = input.username.trim().to_lowercase();
    ensure_username_free(repo, &input.username, None).await?;

    let hasher = hasher.clone();
    let password = std::mem::take(&mut input.password);
    input.password = tokio::task::spawn_blocking(move || hasher.hash_password(&password))
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?
        .map_err(AppError::InternalServerError)?;

    Ok(())
}
