//! Offset pagination types shared by every list query.

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Default page size for mailbox endpoints.
pub const MESSAGE_PAGE_SIZE: u32 = 8;
/// Upper bound accepted for any page size.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Validated pagination parameters (1-indexed page).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ListParams {
    pub page: u32,
    pub page_size: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListParams {
    /// Validate raw query values against the allowed range.
    ///
    /// Mirrors the request contract: page must be >= 1 and page_size must be
    /// within 1..=MAX_PAGE_SIZE, otherwise a user-facing message is returned.
    pub fn checked(page: i64, page_size: i64) -> Result<Self, String> {
        if page < 1 {
            return Err(format!("页码必须是大于0的整数(当前：{})", page));
        }
        if page_size < 1 || page_size > MAX_PAGE_SIZE as i64 {
            return Err(format!(
                "每页条数必须是1-{}之间的整数(当前：{})",
                MAX_PAGE_SIZE, page_size
            ));
        }
        Ok(Self {
            page: page as u32,
            page_size: page_size as u32,
        })
    }

    /// Offset for the database query.
    pub fn offset(&self) -> i64 {
        ((self.page - 1) as i64) * self.page_size as i64
    }

    /// Limit for the database query.
    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

/// One page of results plus the bookkeeping the client needs.
#[derive(Debug, Clone, Serialize)]
pub struct PagedResult<T> {
    pub list: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> PagedResult<T> {
    pub fn new(list: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            list,
            total,
            page: params.page,
            page_size: params.page_size,
        }
    }

    /// Total number of pages (ceiling division).
    pub fn total_page(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            (self.total + self.page_size as i64 - 1) / self.page_size as i64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_defaults_in_range() {
        let params = ListParams::checked(1, 10).unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 10);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.limit(), 10);
    }

    #[test]
    fn test_checked_rejects_zero_page() {
        assert!(ListParams::checked(0, 10).is_err());
        assert!(ListParams::checked(-3, 10).is_err());
    }

    #[test]
    fn test_checked_rejects_oversized_page_size() {
        assert!(ListParams::checked(1, 0).is_err());
        assert!(ListParams::checked(1, MAX_PAGE_SIZE as i64 + 1).is_err());
        assert!(ListParams::checked(1, MAX_PAGE_SIZE as i64).is_ok());
    }

    #[test]
    fn test_offset_arithmetic() {
        let params = ListParams::checked(3, 8).unwrap();
        assert_eq!(params.offset(), 16);
    }

    #[test]
    fn test_total_page_rounding() {
        let params = ListParams::checked(1, 10).unwrap();
        let page = PagedResult::new(Vec::<i32>::new(), 31, &params);
        assert_eq!(page.total_page(), 4);

        let page = PagedResult::new(Vec::<i32>::new(), 30, &params);
        assert_eq!(page.total_page(), 3);

        let page = PagedResult::new(Vec::<i32>::new(), 0, &params);
        assert_eq!(page.total_page(), 0);
    }
}
