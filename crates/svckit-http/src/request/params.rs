//! Path and query parameter parsing.

use crate::constants::DEFAULT_LIMIT;
use crate::error::{ApiError, ApiResult};
use std::collections::HashMap;
use uuid::Uuid;

/// Parse the UUID path parameter `name`.
///
/// A missing or malformed value falls back to `default`, or fails with
/// `invalid param <name>` when there is none.
pub fn path_uuid(
    params: &HashMap<String, String>,
    name: &str,
    default: Option<Uuid>,
) -> ApiResult<Uuid> {
    let parsed = params.get(name).and_then(|raw| Uuid::parse_str(raw).ok());
    parsed
        .or(default)
        .ok_or_else(|| ApiError::InvalidPathParam(name.to_string()))
}

/// Parse the non-negative integer query parameter `name`.
///
/// Absent or empty values yield `default` (or `0`). A present value that is
/// not a non-negative integer fails with `invalid query param <name>`.
pub fn query_int(
    params: &HashMap<String, String>,
    name: &str,
    default: Option<i64>,
) -> ApiResult<i64> {
    match params.get(name).map(String::as_str) {
        None | Some("") => Ok(default.unwrap_or(0)),
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|value| *value >= 0)
            .ok_or_else(|| ApiError::InvalidQueryParam(name.to_string())),
    }
}

/// `limit`/`page` query pair used by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page size.
    pub limit: i64,
    /// One-based page number.
    pub page: i64,
}

impl Pagination {
    /// Read `limit` (default [`DEFAULT_LIMIT`]) and `page` (default `1`).
    pub fn from_query(params: &HashMap<String, String>) -> ApiResult<Self> {
        Ok(Self {
            limit: query_int(params, "limit", Some(DEFAULT_LIMIT))?,
            page: query_int(params, "page", Some(1))?,
        })
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).max(0).saturating_mul(self.limit)
    }
}
