//! Route definitions for the service catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::service;
use crate::state::AppState;

/// ```text
/// GET, POST          /services
/// GET                /services/all
/// GET, PUT, DELETE   /services/{id}
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/services",
            get(service::list_services).post(service::create_service),
        )
        .route("/services/all", get(service::list_all_services))
        .route(
            "/services/{id}",
            get(service::get_service)
                .put(service::update_service)
                .delete(service::delete_service),
        )
}
