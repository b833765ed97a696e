//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` (or, for the order aggregate, an open transaction) as the first
//! argument.

pub mod customer_repo;
pub mod employee_repo;
pub mod order_repo;
pub mod role_repo;
pub mod service_repo;
pub mod vehicle_repo;

pub use customer_repo::CustomerRepo;
pub use employee_repo::EmployeeRepo;
pub use order_repo::OrderRepo;
pub use role_repo::RoleRepo;
pub use service_repo::ServiceRepo;
pub use vehicle_repo::VehicleRepo;
