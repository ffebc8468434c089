use crate::domain::base::{
    DeleteOutcome, Entity, Fields, Repository, RepositoryError, UpdateOutcome, check_fields,
};
use crate::domain::filter::{Direction, Filter};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;

/// Repository keeping records in process memory, with the same contract as the Postgres one.
pub struct InMemoryRepository<E> {
    state: Arc<Mutex<Store<E>>>,
}

struct Store<E> {
    rows: Vec<E>,
    next_id: i64,
}

impl<E> Clone for InMemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(Store {
                rows: Vec::new(),
                next_id: 1,
            })),
        }
    }

    fn matches(row: &E, filter: &Filter) -> bool {
        filter
            .conditions
            .iter()
            .all(|(column, value)| row.get(column).as_ref() == Some(value))
    }

    fn compare(a: &E, b: &E, order: &[(&'static str, Direction)]) -> Ordering {
        for (column, direction) in order {
            let ordering = match *column {
                "created_at" => a.created_at().cmp(&b.created_at()),
                "updated_at" => a.updated_at().cmp(&b.updated_at()),
                column => a.get(column).cmp(&b.get(column)),
            };
            let ordering = match direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        a.id().cmp(&b.id())
    }

    fn select(rows: &[E], filter: &Filter) -> Vec<E> {
        let mut selected: Vec<E> = rows
            .iter()
            .filter(|row| Self::matches(row, filter))
            .cloned()
            .collect();
        selected.sort_by(|a, b| Self::compare(a, b, &filter.order));
        selected
    }

    fn window(rows: Vec<E>, limit: Option<i64>, offset: Option<i64>) -> Vec<E> {
        let offset = offset.unwrap_or(0).max(0) as usize;
        let iter = rows.into_iter().skip(offset);
        match limit {
            Some(limit) => iter.take(limit.max(0) as usize).collect(),
            None => iter.collect(),
        }
    }

    fn check_unique(rows: &[E], fields: &Fields, except: Option<i64>) -> Result<(), RepositoryError> {
        for (name, value) in fields {
            let unique = E::column(name).is_some_and(|c| c.unique);
            if !unique {
                continue;
            }
            let taken = rows
                .iter()
                .filter(|row| Some(row.id()) != except)
                .any(|row| row.get(name).as_ref() == Some(value));
            if taken {
                return Err(RepositoryError::Conflict(format!("{} already exists", E::NAME)));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn find(&self, filter: &Filter) -> Result<Vec<E>, RepositoryError> {
        let store = self.state.lock().await;
        let rows = Self::select(&store.rows, filter);
        Ok(Self::window(rows, filter.take, filter.skip))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<E>, RepositoryError> {
        let store = self.state.lock().await;
        Ok(store.rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<E>, RepositoryError> {
        let store = self.state.lock().await;
        let rows = Self::select(&store.rows, filter);
        Ok(Self::window(rows, Some(1), filter.skip).into_iter().next())
    }

    async fn find_and_count(
        &self,
        filter: &Filter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<E>, i64), RepositoryError> {
        let store = self.state.lock().await;
        let rows = Self::select(&store.rows, filter);
        let total = rows.len() as i64;
        Ok((Self::window(rows, Some(limit), Some(offset)), total))
    }

    async fn create(&self, fields: Fields) -> Result<E, RepositoryError> {
        check_fields::<E>(&fields)?;

        let mut store = self.state.lock().await;
        Self::check_unique(&store.rows, &fields, None)?;

        if let Some(missing) = E::COLUMNS
            .iter()
            .find(|c| c.required && !fields.iter().any(|(name, _)| *name == c.name))
        {
            return Err(RepositoryError::Invalid(format!(
                "null value in column \"{}\"",
                missing.name
            )));
        }

        let mut row = E::blank(store.next_id, OffsetDateTime::now_utc());
        for (column, value) in fields {
            row.set(column, value)?;
        }

        store.next_id += 1;
        store.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, fields: Fields) -> Result<UpdateOutcome, RepositoryError> {
        check_fields::<E>(&fields)?;

        let mut store = self.state.lock().await;
        Self::check_unique(&store.rows, &fields, Some(id))?;

        let Some(row) = store.rows.iter_mut().find(|row| row.id() == id) else {
            return Ok(UpdateOutcome { affected: 0 });
        };

        for (column, value) in fields {
            row.set(column, value)?;
        }
        row.touch(OffsetDateTime::now_utc());

        Ok(UpdateOutcome { affected: 1 })
    }

    async fn delete(&self, id: i64) -> Result<DeleteOutcome, RepositoryError> {
        let mut store = self.state.lock().await;
        let before = store.rows.len();
        store.rows.retain(|row| row.id() != id);

        Ok(DeleteOutcome {
            affected: (before - store.rows.len()) as u64,
        })
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(self.state.lock().await.rows.len() as i64)
    }
}
