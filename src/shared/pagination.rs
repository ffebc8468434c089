use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

pub const DEFAULT_PAGE_SIZE: i64 = 30;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query string accepted by the list endpoint
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FilterQuery {
    /// JSON encoded find options, e.g. `{"where":{"isComplete":false}}`
    pub filter: Option<String>,
}

/// Query string accepted by the pagination endpoint
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PaginationQuery {
    /// Number of items per page
    #[param(example = 30, minimum = 1, maximum = 100)]
    pub page_size: Option<i64>,
    /// Page number (1-indexed)
    #[param(example = 1, minimum = 1)]
    pub page_number: Option<i64>,
    /// JSON encoded find options
    pub filter: Option<String>,
}

/// One page of results plus the number of rows matching the filter overall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub count: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64) -> Self {
        let count = data.len() as i64;
        Self { data, count, total }
    }

    /// Same page with each item projected through `f`; `count` and `total` are kept.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Page<U> {
        Page {
            data: self.data.iter().map(f).collect(),
            count: self.count,
            total: self.total,
        }
    }
}

/// Resolve page size and number into `(limit, offset)`.
/// A page size below 1 is rejected, one above [`MAX_PAGE_SIZE`] is capped.
/// Page numbers below 1 mean the first page; far out of range ones yield an empty page.
pub fn page_bounds(
    page_size: Option<i64>,
    page_number: Option<i64>,
) -> Result<(i64, i64), AppError> {
    let limit = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if limit < 1 {
        return Err(AppError::BadRequest(
            "pageSize must be at least 1".to_string(),
        ));
    }
    let limit = limit.min(MAX_PAGE_SIZE);
    let page = page_number.unwrap_or(1).max(1);

    Ok((limit, (page - 1).saturating_mul(limit)))
}
