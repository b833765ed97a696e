//! Well-known company role name constant.
//!
//! These must match the seed data in `20261019000001_create_company_roles.sql`.

pub const ROLE_ADMIN: &str = "Admin";
