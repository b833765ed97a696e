//! Handlers for the `/customers` resource and a customer's vehicles.

use autoshop_core::error::CoreError;
use autoshop_core::types::DbId;
use autoshop_db::models::customer::{CreateCustomer, UpdateCustomer};
use autoshop_db::models::vehicle::CreateVehicle;
use autoshop_db::repositories::{CustomerRepo, VehicleRepo};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::query::SearchParams;
use crate::response::{DataResponse, PagedResponse};
use crate::state::AppState;

/// GET /api/customers
///
/// Newest first. `search` matches name, email or phone.
pub async fn list_customers(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let window = params.window();
    let page = CustomerRepo::list(&state.pool, params.search.as_deref(), window).await?;
    Ok(Json(PagedResponse::new(page, window)))
}

/// POST /api/customers
pub async fn create_customer(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCustomer>,
) -> AppResult<impl IntoResponse> {
    let customer = CustomerRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: customer })))
}

/// GET /api/customers/{id}
pub async fn get_customer(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let customer = CustomerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Customer",
            id,
        }))?;
    Ok(Json(DataResponse { data: customer }))
}

/// PUT /api/customers/{id}
pub async fn update_customer(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateCustomer>,
) -> AppResult<impl IntoResponse> {
    let customer = CustomerRepo::update(&state.pool, id, &input).await?;
    Ok(Json(DataResponse { data: customer }))
}

/// DELETE /api/customers/{id}
///
/// Removes the customer's vehicles too. 409 while orders reference the customer.
pub async fn delete_customer(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    CustomerRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/customers/{id}/vehicles
pub async fn list_customer_vehicles(
    State(state): State<AppState>,
    AppPath(customer_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let vehicles = CustomerRepo::vehicles(&state.pool, customer_id).await?;
    Ok(Json(DataResponse { data: vehicles }))
}

/// POST /api/customers/{id}/vehicles
pub async fn create_customer_vehicle(
    State(state): State<AppState>,
    AppPath(customer_id): AppPath<DbId>,
    AppJson(input): AppJson<CreateVehicle>,
) -> AppResult<impl IntoResponse> {
    let vehicle = VehicleRepo::create(&state.pool, customer_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: vehicle })))
}
