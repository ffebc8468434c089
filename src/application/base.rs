use crate::domain::base::{DeleteOutcome, Entity, Fields, Repository, UpdateOutcome};
use crate::domain::filter::Filter;
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, page_bounds};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use validator::Validate;

/// Body accepted by the create endpoint of an entity.
pub trait CreateInput: DeserializeOwned + Validate + Send + Sync + 'static {
    fn fields(&self) -> Fields;
}

/// Body accepted by the update endpoints. Only the fields that are present are written.
pub trait UpdateInput: DeserializeOwned + Validate + Send + Sync + 'static {
    fn id(&self) -> Option<i64>;
    fn fields(&self) -> Fields;
}

/// Parsed query of the pagination endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRequest {
    pub page_size: Option<i64>,
    pub page_number: Option<i64>,
    pub filter: Filter,
}

/// CRUD operations shared by every entity, with an optional projection to a view model.
pub struct BaseService<E: Entity, V = E> {
    repo: Arc<dyn Repository<E>>,
    mapper: Option<fn(&E) -> V>,
}

impl<E: Entity, V> Clone for BaseService<E, V> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mapper: self.mapper,
        }
    }
}

impl<E: Entity, V> BaseService<E, V> {
    pub fn new(repo: Arc<dyn Repository<E>>) -> Self {
        Self { repo, mapper: None }
    }

    pub fn with_mapper(mut self, mapper: fn(&E) -> V) -> Self {
        self.mapper = Some(mapper);
        self
    }

    pub fn repository(&self) -> &Arc<dyn Repository<E>> {
        &self.repo
    }

    pub fn parse_id(raw: &str) -> Result<i64, AppError> {
        raw.trim()
            .parse::<i64>()
            .map_err(|_| AppError::BadRequest("Invalid id".to_string()))
    }

    #[tracing::instrument(skip(self), fields(entity = E::NAME))]
    pub async fn find(&self, filter: &Filter) -> Result<Vec<E>, AppError> {
        Ok(self.repo.find(filter).await?)
    }

    /// `None` when no record carries `id`.
    #[tracing::instrument(skip(self), fields(entity = E::NAME))]
    pub async fn find_by_id(&self, id: i64) -> Result<Option<E>, AppError> {
        Ok(self.repo.find_by_id(id).await?)
    }

    pub async fn find_by_raw_id(&self, raw: &str) -> Result<Option<E>, AppError> {
        let id = Self::parse_id(raw)?;
        self.find_by_id(id).await
    }

    #[tracing::instrument(skip(self), fields(entity = E::NAME))]
    pub async fn find_one(&self, filter: &Filter) -> Result<Option<E>, AppError> {
        Ok(self.repo.find_one(filter).await?)
    }

    #[tracing::instrument(skip(self), fields(entity = E::NAME))]
    pub async fn find_and_count(
        &self,
        page_size: Option<i64>,
        page_number: Option<i64>,
        filter: &Filter,
    ) -> Result<Page<E>, AppError> {
        let (limit, offset) = page_bounds(page_size, page_number)?;
        let (data, total) = self.repo.find_and_count(filter, limit, offset).await?;

        Ok(Page::new(data, total))
    }

    #[tracing::instrument(skip(self, fields), fields(entity = E::NAME))]
    pub async fn create(&self, fields: Fields) -> Result<E, AppError> {
        for column in E::COLUMNS.iter().filter(|c| c.required) {
            if !fields.iter().any(|(name, _)| *name == column.name) {
                return Err(AppError::BadRequest(format!("{} is required", column.json)));
            }
        }

        Ok(self.repo.create(fields).await?)
    }

    #[tracing::instrument(skip(self, fields), fields(entity = E::NAME))]
    pub async fn update(&self, id: i64, fields: Fields) -> Result<UpdateOutcome, AppError> {
        Ok(self.repo.update(id, fields).await?)
    }

    #[tracing::instrument(skip(self), fields(entity = E::NAME))]
    pub async fn delete(&self, id: i64) -> Result<DeleteOutcome, AppError> {
        Ok(self.repo.delete(id).await?)
    }

    #[tracing::instrument(skip(self), fields(entity = E::NAME))]
    pub async fn count(&self) -> Result<i64, AppError> {
        Ok(self.repo.count().await?)
    }

    pub fn is_mapped(&self) -> bool {
        self.mapper.is_some()
    }

    /// Project a record to its view model; `None` when no mapper is configured.
    pub fn map(&self, record: &E) -> Option<V> {
        self.mapper.map(|f| f(record))
    }

    pub fn map_all(&self, records: &[E]) -> Option<Vec<V>> {
        self.mapper.map(|f| records.iter().map(f).collect())
    }
}

impl<E: Entity, V> BaseService<E, V>
where
    V: for<'a> From<&'a E>,
{
    /// Enable mapping through the view model's `From<&E>` conversion.
    pub fn with_map(self) -> Self {
        self.with_mapper(|record| V::from(record))
    }
}
