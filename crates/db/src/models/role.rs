//! Company role lookup model.

use autoshop_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `company_roles`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub company_role_id: DbId,
    pub company_role_name: String,
    pub created_at: Timestamp,
}
