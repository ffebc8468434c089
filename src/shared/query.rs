use crate::shared::error::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::de::DeserializeOwned;
use serde_qs::Config;

/// Extractor that deserializes query strings into some type using `serde_qs`.
/// Rejections surface as `400 Bad Request` instead of axum's plain-text default.
pub struct Qs<T>(pub T);

impl<T, S> FromRequestParts<S> for Qs<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or("");
        match Config::default().deserialize_str::<T>(query) {
            Ok(value) => Ok(Qs(value)),
            Err(e) => {
                tracing::warn!("Failed to parse query string: {}", e);
                Err(AppError::BadRequest(format!("Invalid query parameters: {}", e)))
            }
        }
    }
}
