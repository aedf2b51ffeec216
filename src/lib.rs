//! Storefront
//!
//! Cart reconciliation, pricing, checkout rules and the order lifecycle for
//! the storefront. Everything here is pure: persistence and orchestration
//! live in `storefront-app`.

pub mod carts;
pub mod catalog;
pub mod checkout;
pub mod customers;
pub mod errors;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod reconcile;
pub mod uuids;
