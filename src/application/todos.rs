use crate::application::base::{CreateInput, UpdateInput};
use crate::domain::base::{FieldValue, Fields};
use crate::domain::todos::Todo;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use validator::Validate;

/// Todo as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = TodoVM)]
pub struct TodoView {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Buy milk")]
    pub description: String,
    pub is_complete: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&Todo> for TodoView {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            description: todo.description.clone(),
            is_complete: todo.is_complete,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = TodoCreateVM)]
pub struct TodoCreate {
    #[validate(length(min = 1, max = 500, message = "Description must be 1 to 500 characters"))]
    #[schema(example = "Buy milk", min_length = 1, max_length = 500)]
    pub description: String,
}

impl CreateInput for TodoCreate {
    fn fields(&self) -> Fields {
        vec![("description", FieldValue::from(self.description.as_str()))]
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = TodoUpdateVM)]
pub struct TodoUpdate {
    /// Required by `PATCH`; `PUT` creates the todo when it is absent or unknown
    #[schema(example = 1)]
    pub id: Option<i64>,
    #[validate(length(min = 1, max = 500, message = "Description must be 1 to 500 characters"))]
    pub description: Option<String>,
    pub is_complete: Option<bool>,
}

impl UpdateInput for TodoUpdate {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn fields(&self) -> Fields {
        let mut fields = Fields::new();
        if let Some(description) = &self.description {
            fields.push(("description", FieldValue::from(description.as_str())));
        }
        if let Some(is_complete) = self.is_complete {
            fields.push(("is_complete", FieldValue::Bool(is_complete)));
        }
        fields
    }
}
