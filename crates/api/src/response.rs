//! Shared response envelope types for API handlers.

use autoshop_core::pagination::PageWindow;
use autoshop_db::models::Page;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data", "total", "page", "limit" }` for paginated lists.
///
/// `total` is the size of the whole filtered set, not of this page.
#[derive(Debug, Serialize)]
pub struct PagedResponse<T: Serialize> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T: Serialize> PagedResponse<T> {
    pub fn new(page: Page<T>, window: PageWindow) -> Self {
        Self {
            data: page.items,
            total: page.total,
            page: window.page,
            limit: window.limit,
        }
    }
}
