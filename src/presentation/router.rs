use crate::infrastructure::state::AppState;
use crate::presentation::middleware::auth::AuthGuard;
use crate::presentation::middleware::cors::cors_layer;
use crate::presentation::middleware::rate_limit::rate_limit_layer;
use crate::presentation::openapi;
use crate::presentation::routes::{todos, users};
use axum::Router;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use utoipa_swagger_ui::SwaggerUi;

pub fn app(state: AppState) -> anyhow::Result<Router> {
    let guard = AuthGuard::new(&state);
    let todo_controller = Arc::new(todos::controller(&state));
    let user_controller = Arc::new(users::controller(&state));

    let doc = openapi::api_doc([
        todo_controller.openapi(todos::BASE_PATH),
        user_controller.openapi(users::BASE_PATH),
    ]);

    let mut router = Router::new()
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/swagger.json", doc))
        .nest(todos::BASE_PATH, todos::routes(todo_controller, guard.clone()))
        .nest(
            users::BASE_PATH,
            users::routes(&state, user_controller, guard),
        )
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config.cors_allowed_origins)?);

    if let Some(layer) = rate_limit_layer(state.config.rate_limit)? {
        router = router.layer(layer);
    }

    Ok(router.layer(TraceLayer::new_for_http()))
}
