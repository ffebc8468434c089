use crate::application::base::BaseService;
use crate::application::users::{
    UserCreate, UserUpdate, UserView, ensure_username_free, prepare_credentials,
};
use crate::domain::base::Repository;
use crate::domain::users::User;
use crate::infrastructure::state::AppState;
use crate::presentation::crud::{
    AuthFlags, BeforeHook, CrudController, CrudHooks, CrudOptions, Resource, before, handlers,
};
use crate::presentation::handlers::users;
use crate::presentation::middleware::auth::{AuthGuard, require_auth};
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use futures::FutureExt;
use std::sync::Arc;

pub const BASE_PATH: &str = "/api/user";

pub struct UserResource;

impl Resource for UserResource {
    type Entity = User;
    type View = UserView;
    type Create = UserCreate;
    type Update = UserUpdate;
}

/// Lowercase a changed username and make sure no other user holds it.
fn normalize_username(repo: Arc<dyn Repository<User>>) -> Option<BeforeHook<UserUpdate>> {
    before(move |input: &mut UserUpdate| {
        let repo = repo.clone();
        async move {
            if let Some(username) = input.username.as_mut() {
                *username = username.trim().to_lowercase();
                ensure_username_free(&repo, username, input.id).await?;
            }
            Ok(())
        }
        .boxed()
    })
}

/// Every user operation requires a token. Created users get a hashed password.
pub fn controller(state: &AppState) -> CrudController<UserResource> {
    let repo = state.users.clone();
    let hasher = state.password_service.clone();

    let hooks = CrudHooks {
        before_create: before(move |input: &mut UserCreate| {
            let repo = repo.clone();
            let hasher = hasher.clone();
            async move { prepare_credentials(&repo, &hasher, input).await }.boxed()
        }),
        before_update: normalize_username(state.users.clone()),
        before_update_or_create: normalize_username(state.users.clone()),
        ..CrudHooks::default()
    };

    CrudController::new(
        BaseService::new(state.users.clone()).with_map(),
        CrudOptions {
            auth: AuthFlags::default(),
            hooks,
        },
    )
}

/// Account flows plus the generic user surface
pub fn routes(
    state: &AppState,
    controller: Arc<CrudController<UserResource>>,
    guard: AuthGuard,
) -> Router {
    let account = Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route(
            "/validate",
            get(users::validate).route_layer(from_fn_with_state(guard.clone(), require_auth)),
        )
        .route("/confirm/{token}", get(users::confirm))
        .with_state(state.clone());

    account.merge(handlers::router(controller, guard))
}
