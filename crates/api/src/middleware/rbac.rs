//! Role-based access control extractors.

use autoshop_core::error::CoreError;
use autoshop_db::repositories::EmployeeRepo;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `Admin` role. Rejects with 403 Forbidden otherwise.
///
/// The role is read from the database on every request rather than trusted
/// from the token, so a demotion or deactivation takes effect before the
/// token expires. A deactivated account is rejected with 401.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let mut user = AuthUser::from_request_parts(parts, state).await?;

        let role = EmployeeRepo::current_role(&state.pool, &user.email)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Employee account is inactive or no longer exists".into(),
                ))
            })?;
        user.role = role;
        if !user.identity().is_admin() {
            tracing::warn!(
                employee_id = user.employee_id,
                role = %user.role,
                "Admin route refused",
            );
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }

        Ok(RequireAdmin(user))
    }
}
