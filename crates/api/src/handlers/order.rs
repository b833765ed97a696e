//! Handlers for repair orders.
//!
//! Everything except the per-customer listing requires [`RequireAdmin`];
//! mutations pass the admin's identity through to [`OrderService`].

use autoshop_core::error::CoreError;
use autoshop_core::types::DbId;
use autoshop_db::models::order::{CreateOrder, UpdateOrder};
use autoshop_db::services::OrderService;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::rbac::RequireAdmin;
use crate::query::OrderListParams;
use crate::response::{DataResponse, PagedResponse};
use crate::state::AppState;

fn order_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Order", id })
}

/// GET /api/orders
///
/// Filters: `active_order`, `status`, `customer_id`. Sort with `sortby`
/// (e.g. `order_total_price ASC`); page with `page`/`limit` or `offset`.
pub async fn list_orders(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<OrderListParams>,
) -> AppResult<impl IntoResponse> {
    let query = params.into_query()?;
    let page = OrderService::list_orders(&state.pool, &query).await?;
    Ok(Json(PagedResponse::new(page, query.window)))
}

/// POST /api/orders
///
/// Responds with the stored order as `GET /api/orders/{id}` would return it.
pub async fn create_order(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateOrder>,
) -> AppResult<impl IntoResponse> {
    let order_id = OrderService::create_order(&state.pool, &admin.identity(), input).await?;
    let order = OrderService::get_order(&state.pool, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: order })))
}

/// GET /api/orders/{id}
pub async fn get_order(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let order = OrderService::get_order(&state.pool, id)
        .await?
        .ok_or_else(|| order_not_found(id))?;
    Ok(Json(DataResponse { data: order }))
}

/// PUT /api/orders/{id}
pub async fn update_order(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateOrder>,
) -> AppResult<impl IntoResponse> {
    let order = OrderService::modify_order(&state.pool, &admin.identity(), id, input).await?;
    Ok(Json(DataResponse { data: order }))
}

/// DELETE /api/orders/{id}
pub async fn delete_order(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    OrderService::remove_order(&state.pool, &admin.identity(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/orders/customer/{customer_id}
///
/// Accepts `sortby`, `page`, `limit` and `offset`; other filters are ignored.
pub async fn list_customer_orders(
    State(state): State<AppState>,
    AppPath(customer_id): AppPath<DbId>,
    AppQuery(params): AppQuery<OrderListParams>,
) -> AppResult<impl IntoResponse> {
    let window = params.window();
    let page =
        OrderService::orders_by_customer(&state.pool, customer_id, params.sort()?, window).await?;
    Ok(Json(PagedResponse::new(page, window)))
}
