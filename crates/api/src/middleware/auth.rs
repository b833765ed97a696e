//! JWT-based authentication extractor for Axum handlers.

use autoshop_core::error::CoreError;
use autoshop_core::identity::Identity;
use autoshop_core::types::DbId;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Employee extracted from a Bearer token in the `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub employee_id: DbId,
    pub email: String,
    /// Role name from the token, or the freshly read one after [`RequireAdmin`](super::rbac::RequireAdmin).
    pub role: String,
}

impl AuthUser {
    /// The caller as domain operations see it.
    pub fn identity(&self) -> Identity {
        Identity::new(self.employee_id, self.email.clone(), self.role.clone())
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token.trim(), &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            employee_id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}
