use crate::domain::base::{
    DeleteOutcome, Entity, FieldValue, Fields, Repository, RepositoryError, UpdateOutcome,
    check_fields,
};
use crate::domain::filter::Filter;
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::{Postgres, QueryBuilder};
use std::marker::PhantomData;

/// Repository for any [`Entity`], generating its SQL from the declared columns.
pub struct PostgresRepository<E> {
    pool: DbPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PostgresRepository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> PostgresRepository<E> {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    fn select_list() -> String {
        let mut columns = vec!["id"];
        columns.extend(E::COLUMNS.iter().map(|c| c.name));
        columns.extend(["created_at", "updated_at"]);
        columns.join(", ")
    }

    fn select<'a>() -> QueryBuilder<'a, Postgres> {
        QueryBuilder::new(format!("SELECT {} FROM {}", Self::select_list(), E::TABLE))
    }

    fn push_where<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &Filter) {
        for (i, (column, value)) in filter.conditions.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            qb.push(*column).push(" = ");
            push_value(qb, value);
        }
    }

    fn push_order<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &Filter) {
        if filter.order.is_empty() {
            qb.push(" ORDER BY id ASC");
            return;
        }

        qb.push(" ORDER BY ");
        let mut separated = qb.separated(", ");
        for (column, direction) in &filter.order {
            separated.push(format!("{} {}", column, direction.as_sql()));
        }
    }

    fn push_window<'a>(qb: &mut QueryBuilder<'a, Postgres>, limit: Option<i64>, offset: Option<i64>) {
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(limit);
        }
        if let Some(offset) = offset {
            qb.push(" OFFSET ").push_bind(offset);
        }
    }
}

fn push_value<'a>(qb: &mut QueryBuilder<'a, Postgres>, value: &FieldValue) {
    match value {
        FieldValue::Int(v) => qb.push_bind(*v),
        FieldValue::Text(v) => qb.push_bind(v.clone()),
        FieldValue::Bool(v) => qb.push_bind(*v),
    };
}

/// Translate constraint violations into domain errors; everything else stays a database error.
fn classify<E: Entity>(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.kind() {
            ErrorKind::UniqueViolation => {
                return RepositoryError::Conflict(format!("{} already exists", E::NAME));
            }
            ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
                return RepositoryError::Invalid(db_err.message().to_string());
            }
            _ => {}
        }
    }
    RepositoryError::Database(err)
}

#[async_trait]
impl<E: Entity> Repository<E> for PostgresRepository<E> {
    #[tracing::instrument(skip(self), fields(table = E::TABLE))]
    async fn find(&self, filter: &Filter) -> Result<Vec<E>, RepositoryError> {
        let mut qb = Self::select();
        Self::push_where(&mut qb, filter);
        Self::push_order(&mut qb, filter);
        Self::push_window(&mut qb, filter.take, filter.skip);

        let rows = qb
            .build_query_as::<E>()
            .fetch_all(&self.pool)
            .await
            .map_err(classify::<E>)?;

        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(table = E::TABLE))]
    async fn find_by_id(&self, id: i64) -> Result<Option<E>, RepositoryError> {
        let mut qb = Self::select();
        qb.push(" WHERE id = ").push_bind(id);

        let row = qb
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await
            .map_err(classify::<E>)?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(table = E::TABLE))]
    async fn find_one(&self, filter: &Filter) -> Result<Option<E>, RepositoryError> {
        let mut qb = Self::select();
        Self::push_where(&mut qb, filter);
        Self::push_order(&mut qb, filter);
        Self::push_window(&mut qb, Some(1), filter.skip);

        let row = qb
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await
            .map_err(classify::<E>)?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(table = E::TABLE))]
    async fn find_and_count(
        &self,
        filter: &Filter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<E>, i64), RepositoryError> {
        let mut qb = Self::select();
        Self::push_where(&mut qb, filter);
        Self::push_order(&mut qb, filter);
        Self::push_window(&mut qb, Some(limit), Some(offset));

        let rows = qb
            .build_query_as::<E>()
            .fetch_all(&self.pool)
            .await
            .map_err(classify::<E>)?;

        let mut count_qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", E::TABLE));
        Self::push_where(&mut count_qb, filter);

        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(classify::<E>)?;

        Ok((rows, total))
    }

    #[tracing::instrument(skip(self, fields), fields(table = E::TABLE))]
    async fn create(&self, fields: Fields) -> Result<E, RepositoryError> {
        check_fields::<E>(&fields)?;

        let mut qb = QueryBuilder::new(format!("INSERT INTO {}", E::TABLE));
        if fields.is_empty() {
            qb.push(" DEFAULT VALUES");
        } else {
            qb.push(" (");
            let mut columns = qb.separated(", ");
            for (column, _) in &fields {
                columns.push(*column);
            }
            qb.push(") VALUES (");
            for (i, (_, value)) in fields.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                push_value(&mut qb, value);
            }
            qb.push(")");
        }
        qb.push(format!(" RETURNING {}", Self::select_list()));

        let row = qb
            .build_query_as::<E>()
            .fetch_one(&self.pool)
            .await
            .map_err(classify::<E>)?;

        Ok(row)
    }

    #[tracing::instrument(skip(self, fields), fields(table = E::TABLE))]
    async fn update(&self, id: i64, fields: Fields) -> Result<UpdateOutcome, RepositoryError> {
        check_fields::<E>(&fields)?;

        let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", E::TABLE));
        for (column, value) in &fields {
            qb.push(*column).push(" = ");
            push_value(&mut qb, value);
            qb.push(", ");
        }
        qb.push("updated_at = NOW() WHERE id = ").push_bind(id);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(classify::<E>)?;

        Ok(UpdateOutcome {
            affected: result.rows_affected(),
        })
    }

    #[tracing::instrument(skip(self), fields(table = E::TABLE))]
    async fn delete(&self, id: i64) -> Result<DeleteOutcome, RepositoryError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", E::TABLE))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify::<E>)?;

        Ok(DeleteOutcome {
            affected: result.rows_affected(),
        })
    }

    #[tracing::instrument(skip(self), fields(table = E::TABLE))]
    async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", E::TABLE))
            .fetch_one(&self.pool)
            .await
            .map_err(classify::<E>)?;

        Ok(count)
    }
}
