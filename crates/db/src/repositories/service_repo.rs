//! Repository for the `common_services` catalog.

use autoshop_core::error::CoreError;
use autoshop_core::pagination::PageWindow;
use autoshop_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{duplicate_key_message, log_sqlx_failure, DbError, DbResult};
use crate::models::service::{CreateService, Service, ServiceDeletion, UpdateService};
use crate::models::Page;
use crate::{begin_snapshot, settle};

const COLUMNS: &str = "service_id, service_name, service_description";

/// `$1` is a `%pattern%` or NULL.
const SEARCH: &str = "($1::text IS NULL OR service_name ILIKE $1 OR service_description ILIKE $1)";

/// Provides CRUD operations for catalog services.
pub struct ServiceRepo;

impl ServiceRepo {
    pub async fn create(pool: &PgPool, input: &CreateService) -> DbResult<Service> {
        input.check()?;
        let name = input.service_name.trim();
        if Self::name_taken(pool, name, None).await? {
            return Err(duplicate_name().into());
        }
        let query = format!(
            "INSERT INTO common_services (service_name, service_description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let service = sqlx::query_as::<_, Service>(&query)
            .bind(name)
            .bind(input.service_description.trim())
            .fetch_one(pool)
            .await
            .map_err(DbError::from)
            .inspect_err(|e| e.log_storage_failure("service.create", input))?;
        tracing::info!(service_id = service.service_id, "Service created");
        Ok(service)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Service>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM common_services WHERE service_id = $1");
        sqlx::query_as::<_, Service>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of services by name, with the size of the filtered set.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        window: PageWindow,
    ) -> Result<Page<Service>, sqlx::Error> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let mut tx = begin_snapshot(pool).await?;
        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM common_services WHERE {SEARCH}"))
                .bind(&pattern)
                .fetch_one(&mut *tx)
                .await?;
        let items = sqlx::query_as::<_, Service>(&format!(
            "SELECT {COLUMNS} FROM common_services WHERE {SEARCH}
             ORDER BY service_name ASC LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(Page { items, total })
    }

    /// The whole catalog by name, for order forms.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Service>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM common_services ORDER BY service_name ASC");
        sqlx::query_as::<_, Service>(&query).fetch_all(pool).await
    }

    /// Ids from `ids` that are not in the catalog.
    pub async fn missing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar(
            "SELECT wanted.id FROM UNNEST($1::bigint[]) AS wanted(id)
             WHERE NOT EXISTS (SELECT 1 FROM common_services cs WHERE cs.service_id = wanted.id)
             ORDER BY wanted.id",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    pub async fn update(pool: &PgPool, id: DbId, input: &UpdateService) -> DbResult<Service> {
        input.check()?;
        if input.is_empty() {
            return Err(CoreError::NoOpUpdate.into());
        }
        if let Some(name) = input.service_name.as_deref().map(str::trim) {
            if Self::name_taken(pool, name, Some(id)).await? {
                return Err(duplicate_name().into());
            }
        }
        let query = format!(
            "UPDATE common_services SET
                service_name = COALESCE($2, service_name),
                service_description = COALESCE($3, service_description)
             WHERE service_id = $1
             RETURNING {COLUMNS}"
        );
        let service = sqlx::query_as::<_, Service>(&query)
            .bind(id)
            .bind(input.service_name.as_deref().map(str::trim))
            .bind(input.service_description.as_deref().map(str::trim))
            .fetch_optional(pool)
            .await
            .map_err(DbError::from)
            .inspect_err(|e| e.log_storage_failure("service.update", &(id, input)))?
            .ok_or(CoreError::NotFound {
                entity: "Service",
                id,
            })?;
        tracing::info!(service_id = id, "Service updated");
        Ok(service)
    }

    /// Delete a service unless an active order still lists it.
    ///
    /// The row is locked while active references are counted. Lines on
    /// closed orders are detached first so the delete can proceed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<ServiceDeletion, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = Self::delete_inner(&mut tx, id).await;
        let outcome = settle(tx, result)
            .await
            .inspect_err(|e| log_sqlx_failure(e, "service.delete", &id))?;
        match outcome {
            ServiceDeletion::Deleted { detached_lines } => {
                tracing::info!(service_id = id, detached_lines, "Service deleted");
            }
            ServiceDeletion::HasActiveReferences { count } => {
                tracing::info!(service_id = id, count, "Service delete blocked by active orders");
            }
            ServiceDeletion::NotFound => {}
        }
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn delete_inner(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<ServiceDeletion, sqlx::Error> {
        let locked: Option<DbId> = sqlx::query_scalar(
            "SELECT service_id FROM common_services WHERE service_id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
        if locked.is_none() {
            return Ok(ServiceDeletion::NotFound);
        }

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM order_services os
             JOIN orders o ON o.order_id = os.order_id
             WHERE os.service_id = $1 AND o.active_order",
        )
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;
        if count > 0 {
            return Ok(ServiceDeletion::HasActiveReferences { count });
        }

        let detached = sqlx::query("DELETE FROM order_services WHERE service_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        sqlx::query("DELETE FROM common_services WHERE service_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(ServiceDeletion::Deleted {
            detached_lines: detached.rows_affected(),
        })
    }

    async fn name_taken(
        pool: &PgPool,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM common_services
                WHERE service_name = $1 AND ($2::bigint IS NULL OR service_id <> $2))",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }
}

fn duplicate_name() -> CoreError {
    CoreError::DuplicateKey(duplicate_key_message("uq_common_services_name").to_string())
}
