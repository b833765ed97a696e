//! Handlers for employee management. All endpoints require [`RequireAdmin`].

use autoshop_core::error::CoreError;
use autoshop_core::types::DbId;
use autoshop_db::models::employee::{CreateEmployee, UpdateEmployee};
use autoshop_db::repositories::EmployeeRepo;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/employee
pub async fn create_employee(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateEmployee>,
) -> AppResult<impl IntoResponse> {
    // Reject bad input before paying for a hash.
    input.check()?;
    let hash = hash_password(&input.employee_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let employee = EmployeeRepo::create(&state.pool, &input, &hash).await?;
    tracing::info!(
        employee_id = employee.employee_id,
        created_by = admin.employee_id,
        "Employee added",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: employee })))
}

/// GET /api/employees
pub async fn list_employees(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let employees = EmployeeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: employees }))
}

/// GET /api/employees/active
pub async fn list_active_employees(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let employees = EmployeeRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse { data: employees }))
}

/// GET /api/employees/{id}
pub async fn get_employee(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let employee = EmployeeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id,
        }))?;
    Ok(Json(DataResponse { data: employee }))
}

/// PUT /api/employees/{id}
///
/// A present `employee_password` replaces the stored hash.
pub async fn update_employee(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateEmployee>,
) -> AppResult<impl IntoResponse> {
    input.check()?;
    let hash = input
        .employee_password
        .as_deref()
        .map(hash_password)
        .transpose()
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let employee = EmployeeRepo::update(&state.pool, id, &input, hash.as_deref()).await?;
    tracing::info!(employee_id = id, updated_by = admin.employee_id, "Employee edited");
    Ok(Json(DataResponse { data: employee }))
}

/// DELETE /api/employees/{id}
///
/// Deactivates rather than deletes: orders keep referencing the employee.
pub async fn deactivate_employee(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let changed = EmployeeRepo::deactivate(&state.pool, id).await?;
    if !changed && !EmployeeRepo::exists(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id,
        }));
    }
    tracing::info!(employee_id = id, deactivated_by = admin.employee_id, "Employee deactivated");
    Ok(StatusCode::NO_CONTENT)
}
