//! Route definitions for employees. Every route requires an Admin.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::employee;
use crate::state::AppState;

/// ```text
/// POST               /employee
/// GET                /employees
/// GET                /employees/active
/// GET, PUT, DELETE   /employees/{id}
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/employee", post(employee::create_employee))
        .route("/employees", get(employee::list_employees))
        .route("/employees/active", get(employee::list_active_employees))
        .route(
            "/employees/{id}",
            get(employee::get_employee)
                .put(employee::update_employee)
                .delete(employee::deactivate_employee),
        )
}
