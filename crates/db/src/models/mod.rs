//! Row models and request DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` struct matching the joined database row
//! - A `Deserialize` + `Validate` create DTO
//! - A `Deserialize` update DTO (all `Option` fields)

pub mod customer;
pub mod employee;
pub mod order;
pub mod role;
pub mod service;
pub mod vehicle;

/// One page of a filtered list plus the size of the whole filtered set.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}
