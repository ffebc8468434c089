use crate::application::base::BaseService;
use crate::application::todos::{TodoCreate, TodoUpdate, TodoView};
use crate::domain::todos::Todo;
use crate::infrastructure::state::AppState;
use crate::presentation::crud::{
    AuthFlags, CrudController, CrudHooks, CrudOptions, Resource, handlers,
};
use crate::presentation::middleware::auth::AuthGuard;
use axum::Router;
use std::sync::Arc;

pub const BASE_PATH: &str = "/api/todo";

pub struct TodoResource;

impl Resource for TodoResource {
    type Entity = Todo;
    type View = TodoView;
    type Create = TodoCreate;
    type Update = TodoUpdate;
}

/// Todos are public: no operation asks for a token.
pub fn controller(state: &AppState) -> CrudController<TodoResource> {
    CrudController::new(
        BaseService::new(state.todos.clone()).with_map(),
        CrudOptions {
            auth: AuthFlags::from(false),
            hooks: CrudHooks::default(),
        },
    )
}

pub fn routes(controller: Arc<CrudController<TodoResource>>, guard: AuthGuard) -> Router {
    handlers::router(controller, guard)
}
