use crate::domain::auth::{AuthService, Claims, TokenKind};
use crate::domain::users::User;
use crate::infrastructure::config::JwtConfig;
use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry: i64,
}

impl SigningKeys {
    fn from_secret(secret: &str, expiry: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry,
        }
    }
}

/// JWT Authentication Service using HS256.
///
/// Session and confirmation tokens are signed with separate secrets and carry their
/// kind in the `type` claim, so one can never stand in for the other.
pub struct JwtAuthService {
    session: SigningKeys,
    confirmation: SigningKeys,
}

impl JwtAuthService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            session: SigningKeys::from_secret(&config.secret, config.expires_in),
            confirmation: SigningKeys::from_secret(
                &config.confirmation_secret,
                config.confirmation_expires_in,
            ),
        }
    }

    fn keys(&self, kind: TokenKind) -> &SigningKeys {
        match kind {
            TokenKind::Session => &self.session,
            TokenKind::Confirmation => &self.confirmation,
        }
    }

    fn generate(&self, user: &User, kind: TokenKind) -> Result<String> {
        let keys = self.keys(kind);
        let claims = Claims::new(user, kind, keys.expiry);

        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to generate token: {}", e))
    }

    fn validate(&self, token: &str, kind: TokenKind) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.keys(kind).decoding, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid token: {}", e))?;

        if token_data.claims.kind != kind {
            return Err(anyhow::anyhow!("Invalid token type"));
        }

        Ok(token_data.claims)
    }
}

impl AuthService for JwtAuthService {
    fn generate_session_token(&self, user: &User) -> Result<String> {
        self.generate(user, TokenKind::Session)
    }

    fn generate_confirmation_token(&self, user: &User) -> Result<String> {
        self.generate(user, TokenKind::Confirmation)
    }

    fn validate_session_token(&self, token: &str) -> Result<Claims> {
        self.validate(token, TokenKind::Session)
    }

    fn validate_confirmation_token(&self, token: &str) -> Result<Claims> {
        self.validate(token, TokenKind::Confirmation)
    }
}
