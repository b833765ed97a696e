//! Handlers for the `/vehicles` resource.

use autoshop_core::error::CoreError;
use autoshop_core::types::DbId;
use autoshop_db::models::vehicle::UpdateVehicle;
use autoshop_db::repositories::VehicleRepo;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/vehicles/{id}
pub async fn get_vehicle(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let vehicle = VehicleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Vehicle",
            id,
        }))?;
    Ok(Json(DataResponse { data: vehicle }))
}

/// PUT /api/vehicles/{id}
pub async fn update_vehicle(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateVehicle>,
) -> AppResult<impl IntoResponse> {
    let vehicle = VehicleRepo::update(&state.pool, id, &input).await?;
    Ok(Json(DataResponse { data: vehicle }))
}

/// DELETE /api/vehicles/{id}
pub async fn delete_vehicle(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    VehicleRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
