use crate::domain::base::{Column, Entity, FieldKind, FieldValue, RepositoryError};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    /// Lowercased email address
    pub username: String,
    /// Argon2 PHC string; never serialized
    #[serde(skip)]
    pub password: String,
    pub confirmed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Entity for User {
    const NAME: &'static str = "User";
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [Column] = &[
        Column {
            name: "username",
            json: "username",
            kind: FieldKind::Text,
            required: true,
            unique: true,
            filterable: true,
        },
        Column {
            name: "password",
            json: "password",
            kind: FieldKind::Text,
            required: true,
            unique: false,
            filterable: false,
        },
        Column {
            name: "confirmed",
            json: "confirmed",
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
            username: String::new(),
            password: String::new(),
            confirmed: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn get(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(FieldValue::Int(self.id)),
            "username" => Some(FieldValue::Text(self.username.clone())),
            "password" => Some(FieldValue::Text(self.password.clone())),
            "confirmed" => Some(FieldValue::Bool(self.confirmed)),
            _ => None,
        }
    }

    fn set(&mut self, column: &str, value: FieldValue) -> Result<(), RepositoryError> {
        match (column, value) {
            ("username", FieldValue::Text(v)) => self.username = v,
            ("password", FieldValue::Text(v)) => self.password = v,
            ("confirmed", FieldValue::Bool(v)) => self.confirmed = v,
            (column, _) => {
                return Err(RepositoryError::Invalid(format!(
                    "cannot assign User.{}",
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
