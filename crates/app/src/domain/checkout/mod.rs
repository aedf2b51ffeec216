//! Checkout

pub mod errors;
pub mod service;

pub use errors::{CheckoutError, CouponError};
pub use service::*;
