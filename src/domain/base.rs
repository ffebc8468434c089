use crate::domain::filter::Filter;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::postgres::PgRow;
use thiserror::Error;
use time::OffsetDateTime;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Text,
    Bool,
}

/// A single column value crossing the repository boundary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldValue {
    Int(i64),
    Text(String),
    Bool(bool),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Bool(_) => FieldKind::Bool,
        }
    }

    /// Convert a JSON scalar into a value of the given kind, `None` on mismatch.
    pub fn from_json(kind: FieldKind, value: &serde_json::Value) -> Option<Self> {
        match kind {
            FieldKind::Int => value.as_i64().map(FieldValue::Int),
            FieldKind::Text => value.as_str().map(|s| FieldValue::Text(s.to_string())),
            FieldKind::Bool => value.as_bool().map(FieldValue::Bool),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Writable column of an entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// SQL column name
    pub name: &'static str,
    /// camelCase name used by the HTTP API and filters
    pub json: &'static str,
    pub kind: FieldKind,
    /// Must be supplied on insert
    pub required: bool,
    /// Backed by a unique index
    pub unique: bool,
    /// May appear in `where` / `order` clauses of a filter
    pub filterable: bool,
}

/// Ordered list of `(column, value)` pairs for inserts and partial updates.
pub type Fields = Vec<(&'static str, FieldValue)>;

/// Persisted record with the common `id`, `created_at` and `updated_at` columns.
///
/// Every other column is declared in [`Entity::COLUMNS`]; repositories build their
/// SQL and in-memory behaviour from that list.
pub trait Entity:
    Clone + Serialize + Send + Sync + Unpin + for<'r> FromRow<'r, PgRow> + 'static
{
    /// Display name, used for tags and operation ids (`Todo`)
    const NAME: &'static str;
    const TABLE: &'static str;
    const COLUMNS: &'static [Column];

    fn id(&self) -> i64;
    fn created_at(&self) -> OffsetDateTime;
    fn updated_at(&self) -> OffsetDateTime;

    /// New record carrying column defaults, before input fields are applied.
    fn blank(id: i64, now: OffsetDateTime) -> Self;

    /// Read a column by SQL name, `id` included.
    fn get(&self, column: &str) -> Option<FieldValue>;

    fn set(&mut self, column: &str, value: FieldValue) -> Result<(), RepositoryError>;

    fn touch(&mut self, now: OffsetDateTime);

    fn column(name: &str) -> Option<&'static Column> {
        Self::COLUMNS.iter().find(|c| c.name == name)
    }

    fn column_by_json(json: &str) -> Option<&'static Column> {
        Self::COLUMNS.iter().find(|c| c.json == json)
    }
}

/// Ensure every field names a declared column and carries a value of its kind.
pub fn check_fields<E: Entity>(fields: &Fields) -> Result<(), RepositoryError> {
    for (name, value) in fields {
        let column = E::column(name).ok_or_else(|| {
            RepositoryError::Invalid(format!("{} has no column `{}`", E::NAME, name))
        })?;
        if column.kind != value.kind() {
            return Err(RepositoryError::Invalid(format!(
                "{} has the wrong type",
                column.json
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Invalid(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateOutcome {
    /// Number of rows changed
    pub affected: u64,
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteOutcome {
    /// Number of rows removed
    pub affected: u64,
}

#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn find(&self, filter: &Filter) -> Result<Vec<E>, RepositoryError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<E>, RepositoryError>;
    async fn find_one(&self, filter: &Filter) -> Result<Option<E>, RepositoryError>;
    /// Rows of one page plus the number of rows matching `filter` overall.
    async fn find_and_count(
        &self,
        filter: &Filter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<E>, i64), RepositoryError>;
    async fn create(&self, fields: Fields) -> Result<E, RepositoryError>;
    async fn update(&self, id: i64, fields: Fields) -> Result<UpdateOutcome, RepositoryError>;
    async fn delete(&self, id: i64) -> Result<DeleteOutcome, RepositoryError>;
    async fn count(&self) -> Result<i64, RepositoryError>;
}
