use crate::application::users::confirm::ConfirmUseCase;
use crate::application::users::login::LoginUseCase;
use crate::application::users::register::RegisterUseCase;
use crate::application::users::{UserCreate, UserCredentials, UserLogged, UserView};
use crate::infrastructure::state::AppState;
use crate::presentation::extractors::AuthUser;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::validation::ValidatedJson;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

/// Register a new account and mail its confirmation link
#[utoipa::path(
    post,
    path = "/api/user/register",
    operation_id = "User_Register",
    request_body = UserCreate,
    responses(
        (status = 201, description = "Account created, confirmation email sent", body = UserView),
        (status = 400, description = "Invalid input or username taken", body = ErrorResponse),
        (status = 500, description = "Confirmation email could not be sent", body = ErrorResponse)
    ),
    tag = "User"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UserCreate>,
) -> Result<impl IntoResponse, AppError> {
    let use_case = RegisterUseCase::new(
        state.users.clone(),
        state.password_service.clone(),
        state.auth_service.clone(),
        state.mailer.clone(),
        state.config.public_url.clone(),
    );

    let user = use_case.execute(req).await?;

    Ok((StatusCode::CREATED, Json(UserView::from(&user))))
}

/// Exchange credentials of a confirmed account for a session token
#[utoipa::path(
    post,
    path = "/api/user/login",
    operation_id = "User_Login",
    request_body = UserCredentials,
    responses(
        (status = 201, description = "Login successful", body = UserLogged),
        (status = 400, description = "Invalid password or account not confirmed", body = ErrorResponse),
        (status = 404, description = "Invalid username", body = ErrorResponse)
    ),
    tag = "User"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UserCredentials>,
) -> Result<impl IntoResponse, AppError> {
    let use_case = LoginUseCase::new(
        state.users.clone(),
        state.auth_service.clone(),
        state.password_service.clone(),
    );

    let logged = use_case.execute(req).await?;

    Ok((StatusCode::CREATED, Json(logged)))
}

/// User owning the bearer token
#[utoipa::path(
    get,
    path = "/api/user/validate",
    operation_id = "User_Validate",
    responses(
        (status = 200, description = "Token is valid", body = UserView),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn validate(auth_user: AuthUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(UserView::from(&auth_user.user)))
}

/// Confirm an account with the token from its confirmation email
#[utoipa::path(
    get,
    path = "/api/user/confirm/{token}",
    operation_id = "User_Confirm",
    params(
        ("token" = String, Path, description = "Confirmation token")
    ),
    responses(
        (status = 200, description = "Account confirmed", body = UserView),
        (status = 400, description = "Account already confirmed", body = ErrorResponse),
        (status = 403, description = "Invalid or expired confirmation token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "User"
)]
pub async fn confirm(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let use_case = ConfirmUseCase::new(state.users.clone(), state.auth_service.clone());

    let user = use_case.execute(&token).await?;

    Ok(Json(UserView::from(&user)))
}
