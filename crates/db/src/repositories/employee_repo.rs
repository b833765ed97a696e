//! Repository for employees (`employee`, `employee_info`, `employee_pass`,
//! `employee_role`).
//!
//! Passwords arrive here already hashed; this module never sees plaintext.

use autoshop_core::error::CoreError;
use autoshop_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{duplicate_key_message, log_sqlx_failure, DbResult};
use crate::models::employee::{CreateEmployee, Employee, EmployeeCredentials, UpdateEmployee};
use crate::settle;

const SELECT: &str = "SELECT e.employee_id, e.employee_email, e.active_employee, e.added_date, \
     ei.employee_first_name, ei.employee_last_name, ei.employee_phone, \
     cr.company_role_id, cr.company_role_name \
     FROM employee e \
     JOIN employee_info ei ON ei.employee_id = e.employee_id \
     JOIN employee_role er ON er.employee_id = e.employee_id \
     JOIN company_roles cr ON cr.company_role_id = er.company_role_id";

/// Provides CRUD operations for employees.
pub struct EmployeeRepo;

impl EmployeeRepo {
    /// Insert an employee across all four tables in one transaction.
    ///
    /// An unknown `company_role_name` rolls the whole insert back.
    pub async fn create(
        pool: &PgPool,
        input: &CreateEmployee,
        password_hash: &str,
    ) -> DbResult<Employee> {
        input.check()?;
        let email = input.employee_email.trim();
        if Self::email_taken(pool, email, None).await? {
            return Err(duplicate_email().into());
        }

        let mut tx = pool.begin().await?;
        let result = Self::insert(&mut tx, input, password_hash).await;
        // Never the DTO itself: it carries the plain password.
        let employee = settle(tx, result).await.inspect_err(|e| {
            e.log_storage_failure("employee.create", &(email, &input.company_role_name))
        })?;
        tracing::info!(
            employee_id = employee.employee_id,
            role = %employee.company_role_name,
            "Employee created",
        );
        Ok(employee)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("{SELECT} WHERE e.employee_id = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Login lookup, including the password hash.
    pub async fn find_credentials_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<EmployeeCredentials>, sqlx::Error> {
        sqlx::query_as::<_, EmployeeCredentials>(
            "SELECT e.employee_id, e.employee_email, e.active_employee,
                    ei.employee_first_name, ei.employee_last_name,
                    ep.employee_password_hashed, cr.company_role_name
             FROM employee e
             JOIN employee_info ei ON ei.employee_id = e.employee_id
             JOIN employee_pass ep ON ep.employee_id = e.employee_id
             JOIN employee_role er ON er.employee_id = e.employee_id
             JOIN company_roles cr ON cr.company_role_id = er.company_role_id
             WHERE e.employee_email = $1",
        )
        .bind(email.trim())
        .fetch_optional(pool)
        .await
    }

    /// All employees, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Employee>, sqlx::Error> {
        let query = format!("{SELECT} ORDER BY e.employee_id DESC");
        sqlx::query_as::<_, Employee>(&query).fetch_all(pool).await
    }

    /// Active employees only, newest first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Employee>, sqlx::Error> {
        let query = format!("{SELECT} WHERE e.active_employee ORDER BY e.employee_id DESC");
        sqlx::query_as::<_, Employee>(&query).fetch_all(pool).await
    }

    /// Role name of the active employee with this email, read fresh on every
    /// call. `None` once the employee is deactivated or removed.
    pub async fn current_role(pool: &PgPool, email: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT cr.company_role_name
             FROM employee e
             JOIN employee_role er ON er.employee_id = e.employee_id
             JOIN company_roles cr ON cr.company_role_id = er.company_role_id
             WHERE e.employee_email = $1 AND e.active_employee",
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employee WHERE employee_id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Update any subset of identity, profile, password and role in one
    /// transaction. `password_hash` replaces the stored hash when given.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEmployee,
        password_hash: Option<&str>,
    ) -> DbResult<Employee> {
        input.check()?;
        if input.is_empty() {
            return Err(CoreError::NoOpUpdate.into());
        }
        if let Some(email) = input.employee_email.as_deref().map(str::trim) {
            if Self::email_taken(pool, email, Some(id)).await? {
                return Err(duplicate_email().into());
            }
        }

        let mut tx = pool.begin().await?;
        let result = Self::apply_update(&mut tx, id, input, password_hash).await;
        let employee = settle(tx, result).await.inspect_err(|e| {
            let params = (id, &input.employee_email, &input.company_role_name);
            e.log_storage_failure("employee.update", &params)
        })?;
        tracing::info!(employee_id = id, "Employee updated");
        Ok(employee)
    }

    /// Soft-delete: mark the employee inactive. Returns `true` if a row changed.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE employee SET active_employee = FALSE WHERE employee_id = $1 AND active_employee",
        )
        .bind(id)
        .execute(pool)
        .await
        .inspect_err(|e| log_sqlx_failure(e, "employee.deactivate", &id))?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn email_taken(
        pool: &PgPool,
        email: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM employee
                WHERE employee_email = $1 AND ($2::bigint IS NULL OR employee_id <> $2))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        input: &CreateEmployee,
        password_hash: &str,
    ) -> DbResult<Employee> {
        let employee_id: DbId = sqlx::query_scalar(
            "INSERT INTO employee (employee_email, active_employee)
             VALUES ($1, $2)
             RETURNING employee_id",
        )
        .bind(input.employee_email.trim())
        .bind(input.active_employee)
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO employee_info
                (employee_id, employee_first_name, employee_last_name, employee_phone)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(employee_id)
        .bind(input.employee_first_name.trim())
        .bind(input.employee_last_name.trim())
        .bind(input.employee_phone.trim())
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO employee_pass (employee_id, employee_password_hashed) VALUES ($1, $2)",
        )
        .bind(employee_id)
        .bind(password_hash)
        .execute(&mut **tx)
        .await?;

        let role = sqlx::query(
            "INSERT INTO employee_role (employee_id, company_role_id)
             SELECT $1, company_role_id FROM company_roles WHERE company_role_name = $2",
        )
        .bind(employee_id)
        .bind(input.company_role_name.trim())
        .execute(&mut **tx)
        .await?;
        if role.rows_affected() == 0 {
            return Err(role_not_found(&input.company_role_name).into());
        }

        Ok(Self::fetch_in(tx, employee_id).await?)
    }

    async fn apply_update(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        input: &UpdateEmployee,
        password_hash: Option<&str>,
    ) -> DbResult<Employee> {
        let touched = sqlx::query(
            "UPDATE employee SET
                employee_email = COALESCE($2, employee_email),
                active_employee = COALESCE($3, active_employee)
             WHERE employee_id = $1",
        )
        .bind(id)
        .bind(input.employee_email.as_deref().map(str::trim))
        .bind(input.active_employee)
        .execute(&mut **tx)
        .await?;
        if touched.rows_affected() == 0 {
            return Err(CoreError::NotFound {
                entity: "Employee",
                id,
            }
            .into());
        }

        sqlx::query(
            "UPDATE employee_info SET
                employee_first_name = COALESCE($2, employee_first_name),
                employee_last_name = COALESCE($3, employee_last_name),
                employee_phone = COALESCE($4, employee_phone)
             WHERE employee_id = $1",
        )
        .bind(id)
        .bind(input.employee_first_name.as_deref().map(str::trim))
        .bind(input.employee_last_name.as_deref().map(str::trim))
        .bind(input.employee_phone.as_deref().map(str::trim))
        .execute(&mut **tx)
        .await?;

        if let Some(hash) = password_hash {
            sqlx::query(
                "UPDATE employee_pass SET employee_password_hashed = $2 WHERE employee_id = $1",
            )
            .bind(id)
            .bind(hash)
            .execute(&mut **tx)
            .await?;
        }

        if let Some(role_name) = input.company_role_name.as_deref() {
            let role = sqlx::query(
                "UPDATE employee_role SET company_role_id = cr.company_role_id
                 FROM company_roles cr
                 WHERE employee_role.employee_id = $1 AND cr.company_role_name = $2",
            )
            .bind(id)
            .bind(role_name.trim())
            .execute(&mut **tx)
            .await?;
            if role.rows_affected() == 0 {
                return Err(role_not_found(role_name).into());
            }
        }

        Ok(Self::fetch_in(tx, id).await?)
    }

    async fn fetch_in(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Employee, sqlx::Error> {
        let query = format!("{SELECT} WHERE e.employee_id = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }
}

fn duplicate_email() -> CoreError {
    CoreError::DuplicateKey(duplicate_key_message("uq_employee_email").to_string())
}

fn role_not_found(name: &str) -> CoreError {
    CoreError::Validation(format!("company_role_name: role '{}' not found", name.trim()))
}
