pub mod auth;
pub mod customer;
pub mod employee;
pub mod order;
pub mod role;
pub mod service;
pub mod vehicle;
