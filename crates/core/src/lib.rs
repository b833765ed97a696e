//! Domain rules for the auto repair shop backend.
//!
//! This crate performs no I/O. It holds the error taxonomy, input coercion
//! and validation, the order status state machine, and small helpers shared
//! by the persistence and HTTP layers.

pub mod error;
pub mod hashing;
pub mod identity;
pub mod input;
pub mod order_status;
pub mod pagination;
pub mod roles;
pub mod sorting;
pub mod types;
pub mod validation;
