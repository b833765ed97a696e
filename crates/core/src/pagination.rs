//! Paging defaults and helpers shared by every list endpoint.

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Maximum page size for list endpoints.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Clamp a user-provided limit to `[1, max]`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Clamp a 1-based page number to at least 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Resolve the row offset for a request that may carry `page`, `offset`, or both.
///
/// An explicit `offset` wins; otherwise the offset is `(page - 1) * limit`.
pub fn resolve_offset(page: Option<i64>, offset: Option<i64>, limit: i64) -> i64 {
    match offset {
        Some(_) => clamp_offset(offset),
        None => (clamp_page(page) - 1).saturating_mul(limit),
    }
}

/// A resolved page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
    /// 1-based page number the window corresponds to.
    pub page: i64,
}

impl PageWindow {
    /// Build a window from raw query parameters using the default and max limits.
    pub fn from_params(page: Option<i64>, limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = resolve_offset(page, offset, limit);
        Self {
            limit,
            offset,
            page: offset / limit + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_uses_default_when_none() {
        assert_eq!(clamp_limit(None, 10, 100), 10);
    }

    #[test]
    fn clamp_limit_respects_max() {
        assert_eq!(clamp_limit(Some(500), 10, 100), 100);
    }

    #[test]
    fn clamp_limit_floors_at_one() {
        assert_eq!(clamp_limit(Some(0), 10, 100), 1);
        assert_eq!(clamp_limit(Some(-3), 10, 100), 1);
    }

    #[test]
    fn clamp_offset_floors_at_zero() {
        assert_eq!(clamp_offset(Some(-10)), 0);
        assert_eq!(clamp_offset(None), 0);
    }

    #[test]
    fn page_two_of_ten_starts_at_ten() {
        let window = PageWindow::from_params(Some(2), Some(10), None);
        assert_eq!(window, PageWindow { limit: 10, offset: 10, page: 2 });
    }

    #[test]
    fn explicit_offset_wins_over_page() {
        let window = PageWindow::from_params(Some(5), Some(10), Some(3));
        assert_eq!(window.offset, 3);
        assert_eq!(window.page, 1);
    }

    #[test]
    fn defaults_to_first_page() {
        let window = PageWindow::from_params(None, None, None);
        assert_eq!(window, PageWindow { limit: DEFAULT_PAGE_LIMIT, offset: 0, page: 1 });
    }

    #[test]
    fn page_zero_is_treated_as_first_page() {
        assert_eq!(resolve_offset(Some(0), None, 10), 0);
    }
}
