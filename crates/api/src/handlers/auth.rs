//! Handler for `POST /api/login`.

use autoshop_core::error::CoreError;
use autoshop_core::types::DbId;
use autoshop_db::repositories::EmployeeRepo;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

/// Same message for an unknown email and a wrong password.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub employee_email: String,
    pub employee_password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub employee_id: DbId,
    pub employee_first_name: String,
    pub employee_email: String,
    pub role: String,
    pub token: String,
}

/// POST /api/login
///
/// Verify email + password and issue a token.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let unauthorized = || AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()));

    let employee = EmployeeRepo::find_credentials_by_email(&state.pool, &input.employee_email)
        .await?
        .ok_or_else(unauthorized)?;

    let password_valid = verify_password(&input.employee_password, &employee.employee_password_hashed)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::warn!(employee_id = employee.employee_id, "Login refused: wrong password");
        return Err(unauthorized());
    }

    if !employee.active_employee {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let token = generate_token(
        employee.employee_id,
        &employee.employee_email,
        &employee.company_role_name,
        &state.config.jwt,
    )
    .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(
        employee_id = employee.employee_id,
        role = %employee.company_role_name,
        "Employee logged in",
    );

    Ok(Json(LoginResponse {
        employee_id: employee.employee_id,
        employee_first_name: employee.employee_first_name,
        employee_email: employee.employee_email,
        role: employee.company_role_name,
        token,
    }))
}
