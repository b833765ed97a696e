//! Service catalog model and DTOs.

use autoshop_core::error::CoreError;
use autoshop_core::types::DbId;
use autoshop_core::validation::require_text;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from `common_services`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Service {
    pub service_id: DbId,
    pub service_name: String,
    pub service_description: String,
}

/// DTO for adding a catalog service.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateService {
    pub service_name: String,
    pub service_description: String,
}

impl CreateService {
    pub fn check(&self) -> Result<(), CoreError> {
        require_text(&self.service_name, "service_name")?;
        require_text(&self.service_description, "service_description")
    }
}

/// DTO for updating a catalog service. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateService {
    pub service_name: Option<String>,
    pub service_description: Option<String>,
}

impl UpdateService {
    pub fn check(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.service_name {
            require_text(name, "service_name")?;
        }
        if let Some(description) = &self.service_description {
            require_text(description, "service_description")?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.service_name.is_none() && self.service_description.is_none()
    }
}

/// Outcome of deleting a catalog service.
///
/// A service still selected on an active order is not removed; the caller
/// gets the number of those references to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceDeletion {
    /// Removed, along with `detached_lines` lines on closed orders.
    Deleted { detached_lines: u64 },
    NotFound,
    HasActiveReferences { count: i64 },
}
