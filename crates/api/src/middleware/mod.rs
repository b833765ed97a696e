//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the employee behind a valid Bearer token.
//! - [`rbac::RequireAdmin`] -- an `AuthUser` whose current role is `Admin`.

pub mod auth;
pub mod rbac;
