//! Shared query parameter types for API handlers.

use autoshop_core::error::CoreError;
use autoshop_core::input::deserialize_optional_flag;
use autoshop_core::order_status::OrderStatus;
use autoshop_core::pagination::PageWindow;
use autoshop_core::sorting::OrderSort;
use autoshop_core::types::DbId;
use autoshop_db::models::order::{OrderFilter, OrderQuery};
use serde::Deserialize;

/// `?page=&limit=&offset=&search=` for the customer and service lists.
///
/// An explicit `offset` wins over `page`. Limits are clamped by [`PageWindow`].
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchParams {
    pub fn window(&self) -> PageWindow {
        PageWindow::from_params(self.page, self.limit, self.offset)
    }
}

/// Query parameters for the order lists.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListParams {
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub active_order: Option<bool>,
    pub status: Option<String>,
    pub customer_id: Option<DbId>,
    pub sortby: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl OrderListParams {
    pub fn window(&self) -> PageWindow {
        PageWindow::from_params(self.page, self.limit, self.offset)
    }

    pub fn sort(&self) -> Result<OrderSort, CoreError> {
        OrderSort::parse(self.sortby.as_deref())
    }

    pub fn into_query(self) -> Result<OrderQuery, CoreError> {
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<OrderStatus>)
            .transpose()?;
        let filter = OrderFilter {
            active_order: self.active_order,
            status,
            customer_id: self.customer_id,
        };
        Ok(OrderQuery {
            filter,
            sort: self.sort()?,
            window: self.window(),
        })
    }
}
