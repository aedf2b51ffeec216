//! Storefront application: services and persistence.

pub mod context;
pub mod database;
pub mod domain;
pub mod store;

#[cfg(test)]
mod test;
