//! Allow-listed ORDER BY clauses for order listings.
//!
//! Callers pass free-form `sortby` strings such as `"o.order_date DESC"`.
//! Only known columns and directions are accepted, and the SQL fragment is
//! always one of the static strings below, so it is safe to splice into a
//! query.

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Columns an order listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSortField {
    #[default]
    OrderDate,
    OrderId,
    TotalPrice,
    EstimatedCompletion,
    Status,
}

impl OrderSortField {
    /// Qualified column expression for the order listing query.
    pub fn as_sql(self) -> &'static str {
        match self {
            OrderSortField::OrderDate => "o.order_date",
            OrderSortField::OrderId => "o.order_id",
            OrderSortField::TotalPrice => "oi.order_total_price",
            OrderSortField::EstimatedCompletion => "oi.estimated_completion_date",
            OrderSortField::Status => "os.order_status",
        }
    }

    fn from_column(column: &str) -> Option<Self> {
        // Strip an optional table alias ("o.", "oi.", "os.").
        let bare = column.rsplit('.').next().unwrap_or(column);
        match bare.to_ascii_lowercase().as_str() {
            "order_date" => Some(OrderSortField::OrderDate),
            "order_id" => Some(OrderSortField::OrderId),
            "order_total_price" => Some(OrderSortField::TotalPrice),
            "estimated_completion_date" => Some(OrderSortField::EstimatedCompletion),
            "order_status" => Some(OrderSortField::Status),
            _ => None,
        }
    }
}

/// A validated sort specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderSort {
    pub field: OrderSortField,
    pub direction: SortDirection,
}

impl OrderSort {
    /// Parse a `sortby` parameter. `None` or blank means `order_date DESC`.
    pub fn parse(raw: Option<&str>) -> Result<Self, CoreError> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::default());
        };

        let mut parts = raw.split_whitespace();
        let column = parts.next().unwrap_or_default();
        let direction = parts.next();

        let field = OrderSortField::from_column(column)
            .ok_or_else(|| CoreError::Validation(format!("Cannot sort orders by '{column}'")))?;

        let direction = match direction.map(str::to_ascii_uppercase).as_deref() {
            None => SortDirection::Desc,
            Some("ASC") => SortDirection::Asc,
            Some("DESC") => SortDirection::Desc,
            Some(other) => {
                return Err(CoreError::Validation(format!(
                    "Invalid sort direction '{other}'. Use ASC or DESC"
                )))
            }
        };

        if parts.next().is_some() {
            return Err(CoreError::Validation(format!("Invalid sort expression '{raw}'")));
        }

        Ok(Self { field, direction })
    }

    /// ORDER BY body, with `order_id` as a stable tie-breaker.
    pub fn to_sql(self) -> String {
        if self.field == OrderSortField::OrderId {
            format!("{} {}", self.field.as_sql(), self.direction.as_sql())
        } else {
            format!(
                "{} {}, o.order_id {}",
                self.field.as_sql(),
                self.direction.as_sql(),
                self.direction.as_sql()
            )
        }
    }
}
