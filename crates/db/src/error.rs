//! Repository error type.
//!
//! Repositories that enforce business rules return [`DbError`]; plain
//! lookups return `sqlx::Error` directly. Converting a `sqlx::Error` here
//! classifies constraint violations so the storage layer, not the pre-checks,
//! has the final word on duplicates and dangling references.

use std::fmt::Debug;

use autoshop_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A business rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Any other database failure.
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Log an unexpected storage failure with the operation and the values
    /// it bound. Business-rule rejections are not logged here.
    pub fn log_storage_failure(&self, operation: &str, params: &dyn Debug) {
        if let DbError::Database(err) = self {
            log_sqlx_failure(err, operation, params);
        }
    }
}

/// Log a database error at `error` level with the failing operation, its
/// bound values and the SQLSTATE when the server reported one.
pub fn log_sqlx_failure(err: &sqlx::Error, operation: &str, params: &dyn Debug) {
    let sqlstate = match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    };
    tracing::error!(
        operation,
        params = ?params,
        sqlstate = sqlstate.as_deref(),
        error = %err,
        "Storage operation failed",
    );
}

/// PostgreSQL `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL `foreign_key_violation`.
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let code = db_err.code();
            let constraint = db_err.constraint().unwrap_or("unknown");
            match code.as_deref() {
                Some(PG_UNIQUE_VIOLATION) if constraint.starts_with("uq_") => {
                    return DbError::Core(CoreError::DuplicateKey(
                        duplicate_key_message(constraint).to_string(),
                    ));
                }
                Some(PG_FOREIGN_KEY_VIOLATION) => {
                    return DbError::Core(CoreError::Validation(format!(
                        "Referenced record does not exist ({constraint})"
                    )));
                }
                _ => {}
            }
        }
        DbError::Database(err)
    }
}

/// Human-readable message for a unique constraint name.
pub fn duplicate_key_message(constraint: &str) -> &'static str {
    match constraint {
        "uq_customer_identifier_email" => "Customer with this email already exists",
        "uq_employee_email" => "Employee with this email already exists",
        "uq_vehicle_tag" => "A vehicle with this tag already exists",
        "uq_vehicle_serial" => "A vehicle with this serial number already exists",
        "uq_common_services_name" => "A service with this name already exists",
        "uq_order_services_order_service" => "A service can appear only once per order",
        _ => "Duplicate value violates a unique constraint",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_constraints_have_specific_messages() {
        assert_eq!(
            duplicate_key_message("uq_vehicle_serial"),
            "A vehicle with this serial number already exists"
        );
        assert_eq!(
            duplicate_key_message("uq_something_new"),
            "Duplicate value violates a unique constraint"
        );
    }

    #[test]
    fn non_database_errors_stay_database_errors() {
        let err = DbError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn storage_failures_are_logged_with_operation_and_params() {
        use std::io;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Captured {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            DbError::Database(sqlx::Error::PoolTimedOut)
                .log_storage_failure("order.create", &(7_i64, "Oil change"));
            DbError::Core(CoreError::NoOpUpdate).log_storage_failure("order.modify", &8_i64);
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("ERROR"), "{output}");
        assert!(output.contains("order.create"), "{output}");
        assert!(output.contains(r#"(7, "Oil change")"#), "{output}");
        assert!(!output.contains("order.modify"), "{output}");
    }

    #[test]
    fn core_errors_pass_through() {
        let err = DbError::from(CoreError::NoOpUpdate);
        assert!(matches!(err, DbError::Core(CoreError::NoOpUpdate)));
    }
}
