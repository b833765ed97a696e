use axum::routing::get;
use axum::Router;

use crate::handlers::vehicle;
use crate::state::AppState;

/// ```text
/// GET, PUT, DELETE   /vehicles/{id}
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/vehicles/{id}",
        get(vehicle::get_vehicle)
            .put(vehicle::update_vehicle)
            .delete(vehicle::delete_vehicle),
    )
}
