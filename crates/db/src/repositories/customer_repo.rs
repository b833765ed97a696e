//! Repository for customers (`customer_identifier` + `customer_info`).

use autoshop_core::error::CoreError;
use autoshop_core::hashing::generate_customer_hash;
use autoshop_core::pagination::PageWindow;
use autoshop_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{duplicate_key_message, DbError, DbResult};
use crate::models::customer::{CreateCustomer, Customer, UpdateCustomer};
use crate::models::vehicle::Vehicle;
use crate::models::Page;
use crate::repositories::VehicleRepo;
use crate::{begin_snapshot, settle};

/// Joined select shared by every read. Append a `WHERE` clause.
const SELECT: &str = "SELECT ci.customer_id, ci.customer_email, ci.customer_phone_number, \
     ci.customer_added_date, ci.customer_hash, \
     cf.customer_first_name, cf.customer_last_name, cf.active_customer_status \
     FROM customer_identifier ci \
     JOIN customer_info cf ON cf.customer_id = ci.customer_id";

/// Case-insensitive match on name, email or phone. `$1` is a `%pattern%` or NULL.
const SEARCH: &str = "($1::text IS NULL \
     OR cf.customer_first_name ILIKE $1 OR cf.customer_last_name ILIKE $1 \
     OR ci.customer_email ILIKE $1 OR ci.customer_phone_number ILIKE $1)";

/// Provides CRUD operations for customers.
pub struct CustomerRepo;

impl CustomerRepo {
    /// Insert a customer across both tables in one transaction.
    ///
    /// The email pre-check is an early exit; `uq_customer_identifier_email`
    /// decides races.
    pub async fn create(pool: &PgPool, input: &CreateCustomer) -> DbResult<Customer> {
        input.check()?;
        let email = input.customer_email.trim();
        if Self::find_by_email(pool, email).await?.is_some() {
            return Err(duplicate_email().into());
        }

        let mut tx = pool.begin().await?;
        let result = Self::insert(&mut tx, input).await;
        let customer = settle(tx, result)
            .await
            .map_err(DbError::from)
            .inspect_err(|e| e.log_storage_failure("customer.create", input))?;
        tracing::info!(customer_id = customer.customer_id, "Customer created");
        Ok(customer)
    }

    /// Find a customer by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("{SELECT} WHERE ci.customer_id = $1");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a customer by exact email.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("{SELECT} WHERE ci.customer_email = $1");
        sqlx::query_as::<_, Customer>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM customer_identifier WHERE customer_id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// One page of customers, newest first, with the size of the filtered set.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        window: PageWindow,
    ) -> Result<Page<Customer>, sqlx::Error> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let mut tx = begin_snapshot(pool).await?;
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM customer_identifier ci \
             JOIN customer_info cf ON cf.customer_id = ci.customer_id \
             WHERE {SEARCH}"
        ))
        .bind(&pattern)
        .fetch_one(&mut *tx)
        .await?;
        let items = sqlx::query_as::<_, Customer>(&format!(
            "{SELECT} WHERE {SEARCH} ORDER BY ci.customer_id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(Page { items, total })
    }

    /// Update both customer rows. Only non-`None` fields are applied.
    pub async fn update(pool: &PgPool, id: DbId, input: &UpdateCustomer) -> DbResult<Customer> {
        input.check()?;
        if input.is_empty() {
            return Err(CoreError::NoOpUpdate.into());
        }
        if let Some(email) = input.customer_email.as_deref().map(str::trim) {
            if let Some(existing) = Self::find_by_email(pool, email).await? {
                if existing.customer_id != id {
                    return Err(duplicate_email().into());
                }
            }
        }

        let mut tx = pool.begin().await?;
        let result = Self::apply_update(&mut tx, id, input).await;
        let customer = settle(tx, result)
            .await
            .inspect_err(|e| e.log_storage_failure("customer.update", &(id, input)))?;
        tracing::info!(customer_id = id, "Customer updated");
        Ok(customer)
    }

    /// Delete a customer and, by cascade, its vehicles.
    ///
    /// Refused with [`CoreError::Conflict`] while any order references the
    /// customer.
    pub async fn delete(pool: &PgPool, id: DbId) -> DbResult<()> {
        let mut tx = pool.begin().await?;
        let result = Self::delete_inner(&mut tx, id).await;
        settle(tx, result)
            .await
            .inspect_err(|e| e.log_storage_failure("customer.delete", &id))?;
        tracing::info!(customer_id = id, "Customer deleted");
        Ok(())
    }

    /// Vehicles owned by a customer. [`CoreError::NotFound`] if the customer is absent.
    pub async fn vehicles(pool: &PgPool, customer_id: DbId) -> DbResult<Vec<Vehicle>> {
        if !Self::exists(pool, customer_id).await? {
            return Err(CoreError::NotFound {
                entity: "Customer",
                id: customer_id,
            }
            .into());
        }
        Ok(VehicleRepo::list_by_customer(pool, customer_id).await?)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        input: &CreateCustomer,
    ) -> Result<Customer, sqlx::Error> {
        let customer_id: DbId = sqlx::query_scalar(
            "INSERT INTO customer_identifier (customer_email, customer_phone_number, customer_hash)
             VALUES ($1, $2, $3)
             RETURNING customer_id",
        )
        .bind(input.customer_email.trim())
        .bind(input.customer_phone_number.trim())
        .bind(generate_customer_hash())
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO customer_info
                (customer_id, customer_first_name, customer_last_name, active_customer_status)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(customer_id)
        .bind(input.customer_first_name.trim())
        .bind(input.customer_last_name.trim())
        .bind(input.active_customer_status)
        .execute(&mut **tx)
        .await?;

        Self::fetch_in(tx, customer_id).await
    }

    async fn apply_update(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        input: &UpdateCustomer,
    ) -> DbResult<Customer> {
        let touched = sqlx::query(
            "UPDATE customer_identifier SET
                customer_email = COALESCE($2, customer_email),
                customer_phone_number = COALESCE($3, customer_phone_number)
             WHERE customer_id = $1",
        )
        .bind(id)
        .bind(input.customer_email.as_deref().map(str::trim))
        .bind(input.customer_phone_number.as_deref().map(str::trim))
        .execute(&mut **tx)
        .await?;
        if touched.rows_affected() == 0 {
            return Err(CoreError::NotFound {
                entity: "Customer",
                id,
            }
            .into());
        }

        sqlx::query(
            "UPDATE customer_info SET
                customer_first_name = COALESCE($2, customer_first_name),
                customer_last_name = COALESCE($3, customer_last_name),
                active_customer_status = COALESCE($4, active_customer_status)
             WHERE customer_id = $1",
        )
        .bind(id)
        .bind(input.customer_first_name.as_deref().map(str::trim))
        .bind(input.customer_last_name.as_deref().map(str::trim))
        .bind(input.active_customer_status)
        .execute(&mut **tx)
        .await?;

        Ok(Self::fetch_in(tx, id).await?)
    }

    async fn delete_inner(tx: &mut Transaction<'_, Postgres>, id: DbId) -> DbResult<()> {
        let locked: Option<DbId> = sqlx::query_scalar(
            "SELECT customer_id FROM customer_identifier WHERE customer_id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
        if locked.is_none() {
            return Err(CoreError::NotFound {
                entity: "Customer",
                id,
            }
            .into());
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE customer_id = $1")
            .bind(id)
            .fetch_one(&mut **tx)
            .await?;
        if count > 0 {
            return Err(CoreError::Conflict {
                message: format!("Customer has {count} order(s) and cannot be deleted"),
                count,
            }
            .into());
        }

        sqlx::query("DELETE FROM customer_identifier WHERE customer_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn fetch_in(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Customer, sqlx::Error> {
        let query = format!("{SELECT} WHERE ci.customer_id = $1");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }
}

fn duplicate_email() -> CoreError {
    CoreError::DuplicateKey(duplicate_key_message("uq_customer_identifier_email").to_string())
}
