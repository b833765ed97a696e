//! Route definitions for `/customers`.

use axum::routing::get;
use axum::Router;

use crate::handlers::customer;
use crate::state::AppState;

/// ```text
/// GET, POST          /customers
/// GET, PUT, DELETE   /customers/{id}
/// GET, POST          /customers/{id}/vehicles
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/customers",
            get(customer::list_customers).post(customer::create_customer),
        )
        .route(
            "/customers/{id}",
            get(customer::get_customer)
                .put(customer::update_customer)
                .delete(customer::delete_customer),
        )
        .route(
            "/customers/{id}/vehicles",
            get(customer::list_customer_vehicles).post(customer::create_customer_vehicle),
        )
}
