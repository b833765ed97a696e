//! The authenticated caller handed to mutating domain operations.
//!
//! Token verification and role lookup happen at the HTTP boundary; by the time
//! an [`Identity`] exists the caller has already been authenticated.

use crate::roles::ROLE_ADMIN;
use crate::types::DbId;

/// An employee whose token has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub employee_id: DbId,
    pub email: String,
    /// Current role name as stored in `company_roles`.
    pub role: String,
}

impl Identity {
    pub fn new(employee_id: DbId, email: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            employee_id,
            email: email.into(),
            role: role.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}
