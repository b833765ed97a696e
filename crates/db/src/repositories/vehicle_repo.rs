//! Repository for the `customer_vehicle_info` table.

use autoshop_core::error::CoreError;
use autoshop_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{duplicate_key_message, DbError, DbResult};
use crate::models::vehicle::{non_blank, CreateVehicle, UpdateVehicle, Vehicle};
use crate::repositories::CustomerRepo;
use crate::settle;

const COLUMNS: &str = "vehicle_id, customer_id, vehicle_year, vehicle_make, vehicle_model, \
     vehicle_type, vehicle_mileage, vehicle_tag, vehicle_serial, vehicle_color";

/// Provides CRUD operations for vehicles.
pub struct VehicleRepo;

impl VehicleRepo {
    /// Add a vehicle to an existing customer.
    ///
    /// Tag and serial are each unique across all vehicles; the pre-check
    /// gives a specific message, the constraints settle races.
    pub async fn create(
        pool: &PgPool,
        customer_id: DbId,
        input: &CreateVehicle,
    ) -> DbResult<Vehicle> {
        input.check()?;
        if !CustomerRepo::exists(pool, customer_id).await? {
            return Err(CoreError::NotFound {
                entity: "Customer",
                id: customer_id,
            }
            .into());
        }
        let tag = input.normalized_tag();
        let serial = input.vehicle_serial.trim();
        if let Some(existing) = Self::find_by_tag_or_serial(pool, tag, serial, None).await? {
            return Err(collision(&existing, serial).into());
        }

        let query = format!(
            "INSERT INTO customer_vehicle_info
                (customer_id, vehicle_year, vehicle_make, vehicle_model, vehicle_type,
                 vehicle_mileage, vehicle_tag, vehicle_serial, vehicle_color)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let vehicle = sqlx::query_as::<_, Vehicle>(&query)
            .bind(customer_id)
            .bind(input.vehicle_year)
            .bind(input.vehicle_make.trim())
            .bind(input.vehicle_model.trim())
            .bind(input.vehicle_type.trim())
            .bind(input.vehicle_mileage)
            .bind(tag)
            .bind(serial)
            .bind(non_blank(input.vehicle_color.as_deref()))
            .fetch_one(pool)
            .await
            .map_err(DbError::from)
            .inspect_err(|e| e.log_storage_failure("vehicle.create", &(customer_id, input)))?;
        tracing::info!(vehicle_id = vehicle.vehicle_id, customer_id, "Vehicle created");
        Ok(vehicle)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Vehicle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customer_vehicle_info WHERE vehicle_id = $1");
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All vehicles of one customer, oldest first.
    pub async fn list_by_customer(
        pool: &PgPool,
        customer_id: DbId,
    ) -> Result<Vec<Vehicle>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM customer_vehicle_info
             WHERE customer_id = $1
             ORDER BY vehicle_id ASC"
        );
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(customer_id)
            .fetch_all(pool)
            .await
    }

    /// Find a vehicle already using `tag` or `serial`, ignoring `exclude_id`.
    pub async fn find_by_tag_or_serial(
        pool: &PgPool,
        tag: Option<&str>,
        serial: &str,
        exclude_id: Option<DbId>,
    ) -> Result<Option<Vehicle>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM customer_vehicle_info
             WHERE (vehicle_serial = $2 OR ($1::text IS NOT NULL AND vehicle_tag = $1))
               AND ($3::bigint IS NULL OR vehicle_id <> $3)
             LIMIT 1"
        );
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(tag)
            .bind(serial)
            .bind(exclude_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a vehicle. Only non-`None` fields are applied; a blank
    /// `vehicle_tag` clears the tag.
    pub async fn update(pool: &PgPool, id: DbId, input: &UpdateVehicle) -> DbResult<Vehicle> {
        input.check()?;
        if input.is_empty() {
            return Err(CoreError::NoOpUpdate.into());
        }
        let current = Self::find_by_id(pool, id).await?.ok_or(CoreError::NotFound {
            entity: "Vehicle",
            id,
        })?;

        let tag = match &input.vehicle_tag {
            Some(t) => non_blank(Some(t)),
            None => current.vehicle_tag.as_deref(),
        };
        let serial = input
            .vehicle_serial
            .as_deref()
            .map(str::trim)
            .unwrap_or(&current.vehicle_serial);
        if let Some(existing) = Self::find_by_tag_or_serial(pool, tag, serial, Some(id)).await? {
            return Err(collision(&existing, serial).into());
        }

        let query = format!(
            "UPDATE customer_vehicle_info SET
                vehicle_year = COALESCE($2, vehicle_year),
                vehicle_make = COALESCE($3, vehicle_make),
                vehicle_model = COALESCE($4, vehicle_model),
                vehicle_type = COALESCE($5, vehicle_type),
                vehicle_mileage = COALESCE($6, vehicle_mileage),
                vehicle_tag = $7,
                vehicle_serial = $8,
                vehicle_color = COALESCE($9, vehicle_color)
             WHERE vehicle_id = $1
             RETURNING {COLUMNS}"
        );
        let vehicle = sqlx::query_as::<_, Vehicle>(&query)
            .bind(id)
            .bind(input.vehicle_year)
            .bind(input.vehicle_make.as_deref().map(str::trim))
            .bind(input.vehicle_model.as_deref().map(str::trim))
            .bind(input.vehicle_type.as_deref().map(str::trim))
            .bind(input.vehicle_mileage)
            .bind(tag)
            .bind(serial)
            .bind(non_blank(input.vehicle_color.as_deref()))
            .fetch_optional(pool)
            .await
            .map_err(DbError::from)
            .inspect_err(|e| e.log_storage_failure("vehicle.update", &(id, input)))?
            .ok_or(CoreError::NotFound {
                entity: "Vehicle",
                id,
            })?;
        tracing::info!(vehicle_id = id, "Vehicle updated");
        Ok(vehicle)
    }

    /// Delete a vehicle. Refused with [`CoreError::Conflict`] while any
    /// order references it.
    pub async fn delete(pool: &PgPool, id: DbId) -> DbResult<()> {
        let mut tx = pool.begin().await?;
        let result = Self::delete_inner(&mut tx, id).await;
        settle(tx, result)
            .await
            .inspect_err(|e| e.log_storage_failure("vehicle.delete", &id))?;
        tracing::info!(vehicle_id = id, "Vehicle deleted");
        Ok(())
    }

    async fn delete_inner(tx: &mut Transaction<'_, Postgres>, id: DbId) -> DbResult<()> {
        let locked: Option<DbId> = sqlx::query_scalar(
            "SELECT vehicle_id FROM customer_vehicle_info WHERE vehicle_id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
        if locked.is_none() {
            return Err(CoreError::NotFound {
                entity: "Vehicle",
                id,
            }
            .into());
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE vehicle_id = $1")
            .bind(id)
            .fetch_one(&mut **tx)
            .await?;
        if count > 0 {
            return Err(CoreError::Conflict {
                message: format!("Vehicle has {count} order(s) and cannot be deleted"),
                count,
            }
            .into());
        }

        sqlx::query("DELETE FROM customer_vehicle_info WHERE vehicle_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

fn collision(existing: &Vehicle, serial: &str) -> CoreError {
    let constraint = if existing.vehicle_serial == serial {
        "uq_vehicle_serial"
    } else {
        "uq_vehicle_tag"
    };
    CoreError::DuplicateKey(duplicate_key_message(constraint).to_string())
}
