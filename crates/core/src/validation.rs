//! Field validation shared by the create/update DTOs.
//!
//! DTOs derive [`validator::Validate`]; [`validate_input`] turns the
//! collected [`ValidationErrors`] into a single field-level
//! [`CoreError::Validation`] message.

use chrono::Datelike;
use rust_decimal::Decimal;
use validator::{Validate, ValidationErrors};

use crate::error::CoreError;

/// Minimum employee password length (characters).
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Earliest plausible vehicle model year.
pub const MIN_VEHICLE_YEAR: i32 = 1886;


/// Run derive-based validation and flatten the result.
///
/// Messages are sorted by field name so the output is deterministic:
/// `"customer_email: must be a valid email address; customer_phone_number: is required"`.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    input.validate().map_err(|errors| CoreError::Validation(describe(&errors)))
}

fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let detail = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{field}: {detail}")
        })
        .collect();
    fields.sort();
    fields.join("; ")
}

/// Reject blank strings that passed serde because the key was present.
pub fn require_text(value: &str, field: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::Validation(format!("{field}: is required")))
    } else {
        Ok(())
    }
}

/// Phone numbers must contain 7 to 15 digits once separators are removed.
pub fn validate_phone(value: &str, field: &str) -> Result<(), CoreError> {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '+' | '.');
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if value.chars().all(allowed) && (7..=15).contains(&digits) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "{field}: must be a phone number with 7 to 15 digits"
        )))
    }
}

/// Model years run from [`MIN_VEHICLE_YEAR`] to next year's models.
pub fn validate_vehicle_year(year: i32, current_year: i32) -> Result<(), CoreError> {
    let max = current_year + 1;
    if (MIN_VEHICLE_YEAR..=max).contains(&year) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "vehicle_year: must be between {MIN_VEHICLE_YEAR} and {max}"
        )))
    }
}

/// The calendar year used for model-year checks.
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Largest value a `NUMERIC(10, 2)` price column holds.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Prices are non-negative, at most [`MAX_PRICE`], with at most two decimal places.
pub fn validate_price(value: Decimal, field: &str) -> Result<(), CoreError> {
    if value.is_sign_negative() {
        return Err(CoreError::Validation(format!("{field}: must not be negative")));
    }
    if value > MAX_PRICE {
        return Err(CoreError::Validation(format!(
            "{field}: must not exceed {MAX_PRICE}"
        )));
    }
    if value.normalize().scale() > 2 {
        return Err(CoreError::Validation(format!(
            "{field}: must have at most two decimal places"
        )));
    }
    Ok(())
}
