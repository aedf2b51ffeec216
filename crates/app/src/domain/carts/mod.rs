//! Carts

pub mod errors;
pub(crate) mod reconciler;
pub mod service;

pub use errors::CartsServiceError;
pub use service::*;
