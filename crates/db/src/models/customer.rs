//! Customer model and DTOs.
//!
//! A customer spans two tables: `customer_identifier` (email, phone, hash)
//! and `customer_info` (names, active flag).

use autoshop_core::error::CoreError;
use autoshop_core::input::{deserialize_flag, deserialize_optional_flag};
use autoshop_core::types::{DbId, Timestamp};
use autoshop_core::validation::{require_text, validate_input, validate_phone};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A customer joined across `customer_identifier` and `customer_info`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Customer {
    pub customer_id: DbId,
    pub customer_email: String,
    pub customer_phone_number: String,
    pub customer_added_date: Timestamp,
    pub customer_hash: String,
    pub customer_first_name: String,
    pub customer_last_name: String,
    pub active_customer_status: bool,
}

fn default_active() -> bool {
    true
}

/// DTO for creating a customer.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCustomer {
    #[validate(email(message = "must be a valid email address"))]
    pub customer_email: String,
    pub customer_phone_number: String,
    pub customer_first_name: String,
    pub customer_last_name: String,
    /// Accepts `true`/`false` or `1`/`0`. Defaults to active.
    #[serde(default = "default_active", deserialize_with = "deserialize_flag")]
    pub active_customer_status: bool,
}

impl CreateCustomer {
    pub fn check(&self) -> Result<(), CoreError> {
        require_text(&self.customer_email, "customer_email")?;
        require_text(&self.customer_phone_number, "customer_phone_number")?;
        require_text(&self.customer_first_name, "customer_first_name")?;
        require_text(&self.customer_last_name, "customer_last_name")?;
        validate_input(self)?;
        validate_phone(&self.customer_phone_number, "customer_phone_number")
    }
}

/// DTO for updating a customer. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCustomer {
    #[validate(email(message = "must be a valid email address"))]
    pub customer_email: Option<String>,
    pub customer_phone_number: Option<String>,
    pub customer_first_name: Option<String>,
    pub customer_last_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub active_customer_status: Option<bool>,
}

impl UpdateCustomer {
    pub fn check(&self) -> Result<(), CoreError> {
        if let Some(first) = &self.customer_first_name {
            require_text(first, "customer_first_name")?;
        }
        if let Some(last) = &self.customer_last_name {
            require_text(last, "customer_last_name")?;
        }
        validate_input(self)?;
        if let Some(phone) = &self.customer_phone_number {
            validate_phone(phone, "customer_phone_number")?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.customer_email.is_none()
            && self.customer_phone_number.is_none()
            && self.customer_first_name.is_none()
            && self.customer_last_name.is_none()
            && self.active_customer_status.is_none()
    }
}
