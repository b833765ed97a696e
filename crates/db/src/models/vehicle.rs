//! Vehicle model and DTOs.

use autoshop_core::error::CoreError;
use autoshop_core::types::DbId;
use autoshop_core::validation::{current_year, require_text, validate_vehicle_year};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from `customer_vehicle_info`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vehicle {
    pub vehicle_id: DbId,
    pub customer_id: DbId,
    pub vehicle_year: i32,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_type: String,
    pub vehicle_mileage: Option<i32>,
    pub vehicle_tag: Option<String>,
    pub vehicle_serial: String,
    pub vehicle_color: Option<String>,
}

/// DTO for adding a vehicle to a customer. The owner comes from the path.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVehicle {
    pub vehicle_year: i32,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_type: String,
    pub vehicle_mileage: Option<i32>,
    pub vehicle_tag: Option<String>,
    pub vehicle_serial: String,
    pub vehicle_color: Option<String>,
}

impl CreateVehicle {
    pub fn check(&self) -> Result<(), CoreError> {
        validate_vehicle_year(self.vehicle_year, current_year())?;
        require_text(&self.vehicle_make, "vehicle_make")?;
        require_text(&self.vehicle_model, "vehicle_model")?;
        require_text(&self.vehicle_type, "vehicle_type")?;
        require_text(&self.vehicle_serial, "vehicle_serial")?;
        check_mileage(self.vehicle_mileage)
    }

    /// Blank tags are stored as NULL so they never collide.
    pub fn normalized_tag(&self) -> Option<&str> {
        non_blank(self.vehicle_tag.as_deref())
    }
}

/// DTO for updating a vehicle. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVehicle {
    pub vehicle_year: Option<i32>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub vehicle_type: Option<String>,
    pub vehicle_mileage: Option<i32>,
    pub vehicle_tag: Option<String>,
    pub vehicle_serial: Option<String>,
    pub vehicle_color: Option<String>,
}

impl UpdateVehicle {
    pub fn check(&self) -> Result<(), CoreError> {
        if let Some(year) = self.vehicle_year {
            validate_vehicle_year(year, current_year())?;
        }
        for (value, field) in [
            (&self.vehicle_make, "vehicle_make"),
            (&self.vehicle_model, "vehicle_model"),
            (&self.vehicle_type, "vehicle_type"),
            (&self.vehicle_serial, "vehicle_serial"),
        ] {
            if let Some(v) = value {
                require_text(v, field)?;
            }
        }
        check_mileage(self.vehicle_mileage)
    }

    pub fn is_empty(&self) -> bool {
        self.vehicle_year.is_none()
            && self.vehicle_make.is_none()
            && self.vehicle_model.is_none()
            && self.vehicle_type.is_none()
            && self.vehicle_mileage.is_none()
            && self.vehicle_tag.is_none()
            && self.vehicle_serial.is_none()
            && self.vehicle_color.is_none()
    }
}

fn check_mileage(mileage: Option<i32>) -> Result<(), CoreError> {
    match mileage {
        Some(m) if m < 0 => Err(CoreError::Validation(
            "vehicle_mileage: must not be negative".into(),
        )),
        _ => Ok(()),
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
