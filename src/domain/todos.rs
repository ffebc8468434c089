use crate::domain::base::{Column, Entity, FieldKind, FieldValue, RepositoryError};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub description: String,
    pub is_complete: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Entity for Todo {
    const NAME: &'static str = "Todo";
    const TABLE: &'static str = "todos";
    const COLUMNS: &'static [Column] = &[
        Column {
            name: "description",
            json: "description",
            kind: FieldKind::Text,
            required: true,
            unique: false,
            filterable: true,
        },
        Column {
            name: "is_complete",
            json: "isComplete",
            kind: FieldKind::Bool,
            required: false,
            unique: false,
            filterable: true,
        },
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    fn blank(id: i64, now: OffsetDateTime) -> Self {
        Self {
            id,
            description: String::new(),
            is_complete: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn get(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(FieldValue::Int(self.id)),
            "description" => Some(FieldValue::Text(self.description.clone())),
            "is_complete" => Some(FieldValue::Bool(self.is_complete)),
            _ => None,
        }
    }

    fn set(&mut self, column: &str, value: FieldValue) -> Result<(), RepositoryError> {
        match (column, value) {
            ("description", FieldValue::Text(v)) => self.description = v,
            ("is_complete", FieldValue::Bool(v)) => self.is_complete = v,
            (column, _) => {
                return Err(RepositoryError::Invalid(format!(
                    "cannot assign Todo.{}",
                    column
                )));
            }
        }
        Ok(())
    }

    fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = now;
    }
}
