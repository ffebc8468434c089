use super::{CrudController, Mapped, Operation, Resource, Upserted};
use crate::application::base::{BaseService, PageRequest};
use crate::domain::base::{DeleteOutcome, UpdateOutcome};
use crate::domain::filter::Filter;
use crate::presentation::middleware::auth::{AuthGuard, require_auth};
use crate::shared::error::AppError;
use crate::shared::pagination::{FilterQuery, Page, PaginationQuery};
use crate::shared::query::Qs;
use crate::shared::validation::ValidatedJson;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{MethodRouter, delete, get, patch, post, put},
};
use std::sync::Arc;

type Controller<R> = State<Arc<CrudController<R>>>;
type Found<R> = Mapped<<R as Resource>::Entity, <R as Resource>::View>;

pub async fn root<R: Resource>(
    State(controller): Controller<R>,
    Qs(query): Qs<FilterQuery>,
) -> Result<Json<Mapped<Vec<R::Entity>, Vec<R::View>>>, AppError> {
    let filter = Filter::parse::<R::Entity>(query.filter.as_deref())?;
    Ok(Json(controller.root(filter).await?))
}

pub async fn count<R: Resource>(State(controller): Controller<R>) -> Result<Json<i64>, AppError> {
    Ok(Json(controller.count().await?))
}

pub async fn pagination<R: Resource>(
    State(controller): Controller<R>,
    Qs(query): Qs<PaginationQuery>,
) -> Result<Json<Mapped<Page<R::Entity>, Page<R::View>>>, AppError> {
    let request = PageRequest {
        page_size: query.page_size,
        page_number: query.page_number,
        filter: Filter::parse::<R::Entity>(query.filter.as_deref())?,
    };
    Ok(Json(controller.pagination(request).await?))
}

pub async fn get_by_id<R: Resource>(
    State(controller): Controller<R>,
    Path(id): Path<String>,
) -> Result<Json<Found<R>>, AppError> {
    let id = BaseService::<R::Entity, R::View>::parse_id(&id)?;
    Ok(Json(controller.get_by_id(id).await?))
}

pub async fn create<R: Resource>(
    State(controller): Controller<R>,
    ValidatedJson(input): ValidatedJson<R::Create>,
) -> Result<impl IntoResponse, AppError> {
    let created = controller.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_or_create<R: Resource>(
    State(controller): Controller<R>,
    ValidatedJson(input): ValidatedJson<R::Update>,
) -> Result<Response, AppError> {
    let response = match controller.update_or_create(input).await? {
        Upserted::Created(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Upserted::Updated(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
    };
    Ok(response)
}

pub async fn update<R: Resource>(
    State(controller): Controller<R>,
    ValidatedJson(input): ValidatedJson<R::Update>,
) -> Result<Json<UpdateOutcome>, AppError> {
    Ok(Json(controller.update(input).await?))
}

pub async fn delete_one<R: Resource>(
    State(controller): Controller<R>,
    Path(id): Path<String>,
) -> Result<Json<DeleteOutcome>, AppError> {
    let id = BaseService::<R::Entity, R::View>::parse_id(&id)?;
    Ok(Json(controller.delete(id).await?))
}

/// Routes of a controller, relative to where the router gets nested.
/// Operations flagged in the controller's [`super::AuthFlags`] sit behind the bearer guard.
pub fn router<R: Resource>(controller: Arc<CrudController<R>>, guard: AuthGuard) -> Router {
    let auth = controller.auth();
    let guarded = |route: MethodRouter<Arc<CrudController<R>>>, operation: Operation| {
        if auth.requires(operation) {
            route.route_layer(from_fn_with_state(guard.clone(), require_auth))
        } else {
            route
        }
    };

    Router::new()
        .route(
            "/",
            guarded(get(root::<R>), Operation::Root)
                .merge(guarded(post(create::<R>), Operation::Create))
                .merge(guarded(put(update_or_create::<R>), Operation::UpdateOrCreate))
                .merge(guarded(patch(update::<R>), Operation::Update)),
        )
        .route("/count", guarded(get(count::<R>), Operation::Count))
        .route(
            "/pagination",
            guarded(get(pagination::<R>), Operation::Pagination),
        )
        .route(
            "/{id}",
            guarded(get(get_by_id::<R>), Operation::GetById)
                .merge(guarded(delete(delete_one::<R>), Operation::Delete)),
        )
        .with_state(controller)
}
