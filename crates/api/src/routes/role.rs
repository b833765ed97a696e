use axum::routing::get;
use axum::Router;

use crate::handlers::role;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/roles", get(role::list_roles))
}
