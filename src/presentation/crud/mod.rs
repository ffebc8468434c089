pub mod docs;
pub mod handlers;

use crate::application::base::{BaseService, CreateInput, PageRequest, UpdateInput};
use crate::domain::base::{DeleteOutcome, Entity, UpdateOutcome};
use crate::domain::filter::Filter;
use crate::shared::error::AppError;
use crate::shared::pagination::Page;
use futures::future::BoxFuture;
use serde::{Serialize, Serializer};
use std::sync::Arc;
use utoipa::ToSchema;

/// Binds an entity to the view models of its HTTP surface.
pub trait Resource: Send + Sync + 'static {
    type Entity: Entity;
    /// Response shape
    type View: Serialize + ToSchema + Send + Sync + 'static;
    type Create: CreateInput + ToSchema;
    type Update: UpdateInput + ToSchema;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Root,
    Count,
    Pagination,
    GetById,
    Create,
    UpdateOrCreate,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::Root,
        Operation::Count,
        Operation::Pagination,
        Operation::GetById,
        Operation::Create,
        Operation::UpdateOrCreate,
        Operation::Update,
        Operation::Delete,
    ];

    /// Name used in operation ids
    pub fn name(self) -> &'static str {
        match self {
            Operation::Root => "Find",
            Operation::Count => "Count",
            Operation::Pagination => "Pagination",
            Operation::GetById => "FindById",
            Operation::Create => "Create",
            Operation::UpdateOrCreate => "UpdateOrCreate",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
        }
    }
}

/// `<Model>_<Operation>`, each part title-cased word by word with spaces removed.
pub fn operation_id(model: &str, operation: &str) -> String {
    fn title_case(s: &str) -> String {
        s.to_lowercase()
            .split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect()
    }

    format!("{}_{}", title_case(model), title_case(operation))
}

/// Which operations require a bearer token. Every operation is guarded by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthFlags {
    pub root: bool,
    pub get_by_id: bool,
    pub create: bool,
    pub update_or_create: bool,
    pub update: bool,
    pub delete: bool,
    pub count: bool,
    pub pagination: bool,
}

impl AuthFlags {
    pub fn requires(&self, operation: Operation) -> bool {
        match operation {
            Operation::Root => self.root,
            Operation::Count => self.count,
            Operation::Pagination => self.pagination,
            Operation::GetById => self.get_by_id,
            Operation::Create => self.create,
            Operation::UpdateOrCreate => self.update_or_create,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }
}

impl From<bool> for AuthFlags {
    fn from(required: bool) -> Self {
        Self {
            root: required,
            get_by_id: required,
            create: required,
            update_or_create: required,
            update: required,
            delete: required,
            count: required,
            pagination: required,
        }
    }
}

impl Default for AuthFlags {
    fn default() -> Self {
        Self::from(true)
    }
}

/// A result together with its view-model projection, when mapping is enabled.
/// Serializes as the projection if present, the raw value otherwise.
#[derive(Debug, Clone)]
pub struct Mapped<T, V> {
    pub raw: T,
    pub mapped: Option<V>,
}

impl<T: Serialize, V: Serialize> Serialize for Mapped<T, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.mapped {
            Some(mapped) => mapped.serialize(serializer),
            None => self.raw.serialize(serializer),
        }
    }
}

/// Outcome of update-or-create
#[derive(Debug, Clone)]
pub enum Upserted<E, V> {
    Created(Mapped<E, V>),
    Updated(UpdateOutcome),
}

pub type BeforeHook<I> =
    Arc<dyn for<'a> Fn(&'a mut I) -> BoxFuture<'a, Result<(), AppError>> + Send + Sync>;
pub type AfterHook<I, O> =
    Arc<dyn for<'a> Fn(&'a I, &'a O) -> BoxFuture<'a, Result<(), AppError>> + Send + Sync>;

/// Wrap an async closure as a before hook. The hook may rewrite the input or reject it.
pub fn before<I, F>(f: F) -> Option<BeforeHook<I>>
where
    F: for<'a> Fn(&'a mut I) -> BoxFuture<'a, Result<(), AppError>> + Send + Sync + 'static,
{
    Some(Arc::new(f))
}

/// Wrap an async closure as an after hook, called with the input and the result.
pub fn after<I, O, F>(f: F) -> Option<AfterHook<I, O>>
where
    F: for<'a> Fn(&'a I, &'a O) -> BoxFuture<'a, Result<(), AppError>> + Send + Sync + 'static,
{
    Some(Arc::new(f))
}

type E<R> = <R as Resource>::Entity;
type V<R> = <R as Resource>::View;

pub struct CrudHooks<R: Resource> {
    pub before_root: Option<BeforeHook<Filter>>,
    pub after_root: Option<AfterHook<Filter, Mapped<Vec<E<R>>, Vec<V<R>>>>>,
    pub before_count: Option<BeforeHook<()>>,
    pub after_count: Option<AfterHook<(), i64>>,
    pub before_pagination: Option<BeforeHook<PageRequest>>,
    pub after_pagination: Option<AfterHook<PageRequest, Mapped<Page<E<R>>, Page<V<R>>>>>,
    pub before_get_by_id: Option<BeforeHook<i64>>,
    pub after_get_by_id: Option<AfterHook<i64, Mapped<E<R>, V<R>>>>,
    pub before_create: Option<BeforeHook<R::Create>>,
    pub after_create: Option<AfterHook<R::Create, Mapped<E<R>, V<R>>>>,
    pub before_update_or_create: Option<BeforeHook<R::Update>>,
    pub after_update_or_create: Option<AfterHook<R::Update, Upserted<E<R>, V<R>>>>,
    pub before_update: Option<BeforeHook<R::Update>>,
    pub after_update: Option<AfterHook<R::Update, UpdateOutcome>>,
    pub before_delete: Option<BeforeHook<i64>>,
    pub after_delete: Option<AfterHook<i64, DeleteOutcome>>,
}

impl<R: Resource> Default for CrudHooks<R> {
    fn default() -> Self {
        Self {
            before_root: None,
            after_root: None,
            before_count: None,
            after_count: None,
            before_pagination: None,
            after_pagination: None,
            before_get_by_id: None,
            after_get_by_id: None,
            before_create: None,
            after_create: None,
            before_update_or_create: None,
            after_update_or_create: None,
            before_update: None,
            after_update: None,
            before_delete: None,
            after_delete: None,
        }
    }
}

pub struct CrudOptions<R: Resource> {
    pub auth: AuthFlags,
    pub hooks: CrudHooks<R>,
}

impl<R: Resource> Default for CrudOptions<R> {
    fn default() -> Self {
        Self {
            auth: AuthFlags::default(),
            hooks: CrudHooks::default(),
        }
    }
}

async fn run_before<I>(hook: &Option<BeforeHook<I>>, input: &mut I) -> Result<(), AppError> {
    match hook {
        Some(hook) => hook(input).await,
        None => Ok(()),
    }
}

async fn run_after<I, O>(
    hook: &Option<AfterHook<I, O>>,
    input: &I,
    output: &O,
) -> Result<(), AppError> {
    match hook {
        Some(hook) => hook(input, output).await,
        None => Ok(()),
    }
}

/// Generic REST surface for an entity: wraps a [`BaseService`] and exposes the eight
/// standard operations, each optionally guarded by bearer auth ([`AuthFlags`]) and
/// surrounded by before/after hooks ([`CrudHooks`]). [`handlers::router`] mounts it,
/// [`CrudController::openapi`] documents it.
pub struct CrudController<R: Resource> {
    service: BaseService<E<R>, V<R>>,
    auth: AuthFlags,
    hooks: CrudHooks<R>,
}

impl<R: Resource> CrudController<R> {
    pub fn new(service: BaseService<E<R>, V<R>>, options: CrudOptions<R>) -> Self {
        Self {
            service,
            auth: options.auth,
            hooks: options.hooks,
        }
    }

    pub fn service(&self) -> &BaseService<E<R>, V<R>> {
        &self.service
    }

    pub fn auth(&self) -> AuthFlags {
        self.auth
    }

    fn mapped(&self, raw: E<R>) -> Mapped<E<R>, V<R>> {
        let mapped = self.service.map(&raw);
        Mapped { raw, mapped }
    }

    fn not_found() -> AppError {
        AppError::NotFound(format!("{} not found", <E<R> as Entity>::NAME))
    }

    pub async fn root(&self, mut filter: Filter) -> Result<Mapped<Vec<E<R>>, Vec<V<R>>>, AppError> {
        run_before(&self.hooks.before_root, &mut filter).await?;

        let raw = self.service.find(&filter).await?;
        let mapped = self.service.map_all(&raw);
        let result = Mapped { raw, mapped };

        run_after(&self.hooks.after_root, &filter, &result).await?;
        Ok(result)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        run_before(&self.hooks.before_count, &mut ()).await?;

        let count = self.service.count().await?;

        run_after(&self.hooks.after_count, &(), &count).await?;
        Ok(count)
    }

    pub async fn pagination(
        &self,
        mut request: PageRequest,
    ) -> Result<Mapped<Page<E<R>>, Page<V<R>>>, AppError> {
        run_before(&self.hooks.before_pagination, &mut request).await?;

        let raw = self
            .service
            .find_and_count(request.page_size, request.page_number, &request.filter)
            .await?;
        let mapped = self.service.map_all(&raw.data).map(|data| Page {
            data,
            count: raw.count,
            total: raw.total,
        });
        let result = Mapped { raw, mapped };

        run_after(&self.hooks.after_pagination, &request, &result).await?;
        Ok(result)
    }

    pub async fn get_by_id(&self, mut id: i64) -> Result<Mapped<E<R>, V<R>>, AppError> {
        run_before(&self.hooks.before_get_by_id, &mut id).await?;

        let record = self
            .service
            .find_by_id(id)
            .await?
            .ok_or_else(Self::not_found)?;
        let result = self.mapped(record);

        run_after(&self.hooks.after_get_by_id, &id, &result).await?;
        Ok(result)
    }

    pub async fn create(&self, mut input: R::Create) -> Result<Mapped<E<R>, V<R>>, AppError> {
        run_before(&self.hooks.before_create, &mut input).await?;

        let record = self.service.create(input.fields()).await?;
        let result = self.mapped(record);

        run_after(&self.hooks.after_create, &input, &result).await?;
        Ok(result)
    }

    /// Update the record named by `input.id`, or create one when the id is absent or unknown.
    pub async fn update_or_create(
        &self,
        mut input: R::Update,
    ) -> Result<Upserted<E<R>, V<R>>, AppError> {
        let existing = match input.id() {
            Some(id) => self.service.find_by_id(id).await?,
            None => None,
        };

        run_before(&self.hooks.before_update_or_create, &mut input).await?;

        let result = match existing {
            Some(record) => {
                Upserted::Updated(self.service.update(record.id(), input.fields()).await?)
            }
            None => {
                let record = self.service.create(input.fields()).await?;
                Upserted::Created(self.mapped(record))
            }
        };

        run_after(&self.hooks.after_update_or_create, &input, &result).await?;
        Ok(result)
    }

    pub async fn update(&self, mut input: R::Update) -> Result<UpdateOutcome, AppError> {
        run_before(&self.hooks.before_update, &mut input).await?;

        let id = input
            .id()
            .ok_or_else(|| AppError::BadRequest("id is required".to_string()))?;
        let outcome = self.service.update(id, input.fields()).await?;

        run_after(&self.hooks.after_update, &input, &outcome).await?;
        Ok(outcome)
    }

    pub async fn delete(&self, mut id: i64) -> Result<DeleteOutcome, AppError> {
        run_before(&self.hooks.before_delete, &mut id).await?;

        let outcome = self.service.delete(id).await?;

        run_after(&self.hooks.after_delete, &id, &outcome).await?;
        Ok(outcome)
    }
}
