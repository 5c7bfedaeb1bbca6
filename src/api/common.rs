//! Common API utilities

use serde::Deserialize;

use crate::api::middleware::ApiError;
use crate::models::{ListParams, DEFAULT_PAGE_SIZE};

/// Pagination query parameters as they arrive on the wire
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<i64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
}

/// Validate pagination query values, falling back to defaults when absent.
pub fn checked_params(
    page: Option<i64>,
    page_size: Option<i64>,
    default_size: u32,
) -> Result<ListParams, ApiError> {
    ListParams::checked(
        page.unwrap_or(1),
        page_size.unwrap_or(default_size as i64),
    )
    .map_err(ApiError::bad_request)
}

/// Validate pagination with the standard default page size.
pub fn default_params(query: &PaginationQuery) -> Result<ListParams, ApiError> {
    checked_params(query.page, query.page_size, DEFAULT_PAGE_SIZE)
}
