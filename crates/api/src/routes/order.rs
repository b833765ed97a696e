//! Route definitions for `/orders`.

use axum::routing::get;
use axum::Router;

use crate::handlers::order;
use crate::state::AppState;

/// ```text
/// GET, POST          /orders                          (admin)
/// GET, PUT, DELETE   /orders/{id}                     (admin)
/// GET                /orders/customer/{customer_id}
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(order::list_orders).post(order::create_order))
        .route(
            "/orders/{id}",
            get(order::get_order)
                .put(order::update_order)
                .delete(order::delete_order),
        )
        .route(
            "/orders/customer/{customer_id}",
            get(order::list_customer_orders),
        )
}
