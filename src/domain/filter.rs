use crate::domain::base::{Entity, FieldKind, FieldValue};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid filter: {0}")]
pub struct FilterError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Find options handed to a repository: equality conditions, ordering and an
/// optional window. Column names are SQL names taken from the entity's
/// declared columns, never from user input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub conditions: Vec<(&'static str, FieldValue)>,
    pub order: Vec<(&'static str, Direction)>,
    pub take: Option<i64>,
    pub skip: Option<i64>,
}

const OPTION_KEYS: [&str; 4] = ["where", "order", "take", "skip"];

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<FieldValue>) -> Self {
        self.conditions.push((column, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.order.is_empty() && self.take.is_none() && self.skip.is_none()
    }

    /// Parse the `filter` query parameter. An absent or blank parameter is an empty filter.
    ///
    /// Accepts either find options (`{"where": {...}, "order": {...}, "take": n, "skip": n}`)
    /// or a bare equality object, which is read as `where`.
    pub fn parse<E: Entity>(raw: Option<&str>) -> Result<Self, FilterError> {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(Self::default());
        };

        let value: Value = serde_json::from_str(raw)
            .map_err(|e| FilterError(format!("malformed JSON: {}", e)))?;

        Self::from_json::<E>(&value)
    }

    pub fn from_json<E: Entity>(value: &Value) -> Result<Self, FilterError> {
        let Value::Object(map) = value else {
            return Err(FilterError("expected a JSON object".to_string()));
        };

        let mut filter = Self::default();

        if !map.keys().any(|k| OPTION_KEYS.contains(&k.as_str())) {
            filter.conditions = conditions::<E>(map)?;
            return Ok(filter);
        }

        for (key, value) in map {
            match key.as_str() {
                "where" => {
                    let Value::Object(clause) = value else {
                        return Err(FilterError("`where` must be an object".to_string()));
                    };
                    filter.conditions = conditions::<E>(clause)?;
                }
                "order" => {
                    let Value::Object(clause) = value else {
                        return Err(FilterError("`order` must be an object".to_string()));
                    };
                    filter.order = order::<E>(clause)?;
                }
                "take" => filter.take = Some(non_negative(value, "take")?),
                "skip" => filter.skip = Some(non_negative(value, "skip")?),
                other => {
                    return Err(FilterError(format!(
                        "`{}` cannot be combined with find options",
                        other
                    )));
                }
            }
        }

        Ok(filter)
    }
}

fn conditions<E: Entity>(
    clause: &Map<String, Value>,
) -> Result<Vec<(&'static str, FieldValue)>, FilterError> {
    clause
        .iter()
        .map(|(key, value)| {
            let (column, kind) = match key.as_str() {
                "id" => ("id", FieldKind::Int),
                other => {
                    let column = E::column_by_json(other)
                        .filter(|c| c.filterable)
                        .ok_or_else(|| FilterError(format!("unknown field `{}`", other)))?;
                    (column.name, column.kind)
                }
            };

            let value = FieldValue::from_json(kind, value)
                .ok_or_else(|| FilterError(format!("`{}` has the wrong type", key)))?;

            Ok((column, value))
        })
        .collect()
}

fn order<E: Entity>(
    clause: &Map<String, Value>,
) -> Result<Vec<(&'static str, Direction)>, FilterError> {
    clause
        .iter()
        .map(|(key, value)| {
            let column = match key.as_str() {
                "id" => "id",
                "createdAt" => "created_at",
                "updatedAt" => "updated_at",
                other => {
                    E::column_by_json(other)
                        .filter(|c| c.filterable)
                        .ok_or_else(|| FilterError(format!("unknown field `{}`", other)))?
                        .name
                }
            };

            let direction = match value {
                Value::String(s) if s.eq_ignore_ascii_case("asc") => Direction::Asc,
                Value::String(s) if s.eq_ignore_ascii_case("desc") => Direction::Desc,
                Value::Number(n) if n.as_i64() == Some(1) => Direction::Asc,
                Value::Number(n) if n.as_i64() == Some(-1) => Direction::Desc,
                _ => {
                    return Err(FilterError(format!(
                        "order of `{}` must be ASC or DESC",
                        key
                    )));
                }
            };

            Ok((column, direction))
        })
        .collect()
}

fn non_negative(value: &Value, name: &str) -> Result<i64, FilterError> {
    value
        .as_i64()
        .filter(|n| *n >= 0)
        .ok_or_else(|| FilterError(format!("`{}` must be a non-negative integer", name)))
}
