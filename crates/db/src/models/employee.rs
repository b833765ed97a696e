//! Employee model and DTOs.
//!
//! An employee spans four tables: `employee` (email, active flag),
//! `employee_info` (names, phone), `employee_pass` (password hash) and
//! `employee_role` (one company role).

use autoshop_core::error::CoreError;
use autoshop_core::input::{deserialize_flag, deserialize_optional_flag};
use autoshop_core::types::{DbId, Timestamp};
use autoshop_core::validation::{require_text, validate_input, validate_phone};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// An employee with profile and role. Never carries the password hash.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Employee {
    pub employee_id: DbId,
    pub employee_email: String,
    pub active_employee: bool,
    pub added_date: Timestamp,
    pub employee_first_name: String,
    pub employee_last_name: String,
    pub employee_phone: String,
    pub company_role_id: DbId,
    pub company_role_name: String,
}

/// Login lookup row. Contains the password hash, so it is not `Serialize`.
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeCredentials {
    pub employee_id: DbId,
    pub employee_email: String,
    pub active_employee: bool,
    pub employee_first_name: String,
    pub employee_last_name: String,
    pub employee_password_hashed: String,
    pub company_role_name: String,
}

fn default_active() -> bool {
    true
}

/// DTO for creating an employee. The password is hashed by the caller
/// before it reaches the repository.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEmployee {
    #[validate(email(message = "must be a valid email address"))]
    pub employee_email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters long"))]
    pub employee_password: String,
    pub employee_first_name: String,
    pub employee_last_name: String,
    pub employee_phone: String,
    pub company_role_name: String,
    #[serde(default = "default_active", deserialize_with = "deserialize_flag")]
    pub active_employee: bool,
}

impl CreateEmployee {
    pub fn check(&self) -> Result<(), CoreError> {
        require_text(&self.employee_email, "employee_email")?;
        require_text(&self.employee_password, "employee_password")?;
        require_text(&self.employee_first_name, "employee_first_name")?;
        require_text(&self.employee_last_name, "employee_last_name")?;
        require_text(&self.employee_phone, "employee_phone")?;
        require_text(&self.company_role_name, "company_role_name")?;
        validate_input(self)?;
        validate_phone(&self.employee_phone, "employee_phone")
    }
}

/// DTO for updating an employee. Absent fields are left unchanged; a present
/// `employee_password` is re-hashed by the caller.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEmployee {
    #[validate(email(message = "must be a valid email address"))]
    pub employee_email: Option<String>,
    #[validate(length(min = 8, message = "must be at least 8 characters long"))]
    pub employee_password: Option<String>,
    pub employee_first_name: Option<String>,
    pub employee_last_name: Option<String>,
    pub employee_phone: Option<String>,
    pub company_role_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub active_employee: Option<bool>,
}

impl UpdateEmployee {
    pub fn check(&self) -> Result<(), CoreError> {
        for (value, field) in [
            (&self.employee_first_name, "employee_first_name"),
            (&self.employee_last_name, "employee_last_name"),
            (&self.company_role_name, "company_role_name"),
        ] {
            if let Some(v) = value {
                require_text(v, field)?;
            }
        }
        validate_input(self)?;
        if let Some(phone) = &self.employee_phone {
            validate_phone(phone, "employee_phone")?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.employee_email.is_none()
            && self.employee_password.is_none()
            && self.employee_first_name.is_none()
            && self.employee_last_name.is_none()
            && self.employee_phone.is_none()
            && self.company_role_name.is_none()
            && self.active_employee.is_none()
    }
}
