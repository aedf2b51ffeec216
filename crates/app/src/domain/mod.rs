//! Storefront Services

pub mod carts;
pub mod checkout;
pub mod maintenance;
pub mod orders;
