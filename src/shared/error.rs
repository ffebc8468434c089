use crate::domain::base::RepositoryError;
use crate::domain::filter::FilterError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) | RepositoryError::Invalid(msg) => {
                AppError::BadRequest(msg)
            }
            RepositoryError::Database(e) => AppError::InternalServerError(e.into()),
        }
    }
}

impl From<FilterError> for AppError {
    fn from(err: FilterError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Single error object inside an [`ErrorResponse`]
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    #[schema(example = 400)]
    pub status: u16,
    #[schema(example = "Bad Request")]
    pub title: String,
    #[schema(example = "Invalid id")]
    pub detail: String,
}

/// Error body returned by every endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub errors: Vec<ApiError>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            AppError::BadRequest(msg)
            | AppError::ValidationError(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg,
            AppError::InternalServerError(e) => {
                tracing::error!("Internal server error: {:?}", e);
                "Internal server error".to_string()
            }
        };

        let body = ErrorResponse {
            errors: vec![ApiError {
                status: status.as_u16(),
                title: status.canonical_reason().unwrap_or("Error").to_string(),
                detail,
            }],
        };

        (status, Json(body)).into_response()
    }
}
