//! Repository for the `company_roles` lookup table.

use sqlx::PgPool;

use crate::models::role::Role;

const COLUMNS: &str = "company_role_id, company_role_name, created_at";

/// Read-only access to company roles.
pub struct RoleRepo;

impl RoleRepo {
    /// All roles, ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM company_roles ORDER BY company_role_id");
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM company_roles WHERE company_role_name = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
