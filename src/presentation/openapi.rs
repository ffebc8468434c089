use crate::application::users::{UserCreate, UserCredentials, UserLogged, UserView};
use crate::domain::base::{DeleteOutcome, UpdateOutcome};
use crate::shared::error::{ApiError, ErrorResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CrudKit API",
        version = "0.1.0",
        description = "Generic CRUD REST API with Axum and SQLx"
    ),
    paths(
        crate::presentation::handlers::users::register,
        crate::presentation::handlers::users::login,
        crate::presentation::handlers::users::validate,
        crate::presentation::handlers::users::confirm,
    ),
    components(
        schemas(
            UserView,
            UserCreate,
            UserCredentials,
            UserLogged,
            UpdateOutcome,
            DeleteOutcome,
            ErrorResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

/// Full document: the annotated account endpoints plus the generated CRUD surfaces.
pub fn api_doc(crud_docs: impl IntoIterator<Item = utoipa::openapi::OpenApi>) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    for crud in crud_docs {
        doc.merge(crud);
    }
    doc
}
