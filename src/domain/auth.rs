use crate::domain::users::User;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Session,
    Confirmation,
}

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Unique token id, keeps two tokens issued in the same second distinct
    pub jti: String,
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

impl Claims {
    pub fn new(user: &User, kind: TokenKind, expiry_seconds: i64) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: now,
            exp: now.saturating_add(expiry_seconds),
            jti: Uuid::new_v4().to_string(),
            kind,
        }
    }

    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid user ID in claims: {}", e))
    }
}

/// Auth service trait for JWT operations
pub trait AuthService: Send + Sync {
    /// Short-lived token proving a login
    fn generate_session_token(&self, user: &User) -> Result<String>;

    /// Token embedded in the confirmation email
    fn generate_confirmation_token(&self, user: &User) -> Result<String>;

    fn validate_session_token(&self, token: &str) -> Result<Claims>;

    fn validate_confirmation_token(&self, token: &str) -> Result<Claims>;
}
