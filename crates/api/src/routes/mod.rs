pub mod auth;
pub mod customer;
pub mod employee;
pub mod health;
pub mod order;
pub mod role;
pub mod service;
pub mod vehicle;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /login                                   issue token (public)
///
/// /customers                               list, create
/// /customers/{id}                          get, update, delete
/// /customers/{id}/vehicles                 list, add
/// /vehicles/{id}                           get, update, delete
///
/// /employee                                create (admin)
/// /employees                               list (admin)
/// /employees/active                        active roster (admin)
/// /employees/{id}                          get, update, deactivate (admin)
/// /roles                                   list (admin)
///
/// /orders                                  list, create (admin)
/// /orders/{id}                             get, update, delete (admin)
/// /orders/customer/{customer_id}           orders of one customer
///
/// /services                                list, create
/// /services/all                            whole catalog
/// /services/{id}                           get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(customer::router())
        .merge(vehicle::router())
        .merge(employee::router())
        .merge(role::router())
        .merge(order::router())
        .merge(service::router())
}
