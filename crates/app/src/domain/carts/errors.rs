//! Carts service errors.

use storefront::{
    carts::CartError,
    catalog::Unavailable,
    errors::{Classify, ErrorClass},
};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Unavailable(#[from] Unavailable),

    #[error("cart was modified concurrently")]
    ConcurrentUpdate,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CartsServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::StaleWrite => Self::ConcurrentUpdate,
            other => Self::Store(other),
        }
    }
}

impl Classify for CartsServiceError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::Cart(error) => error.class(),
            Self::Unavailable(Unavailable::ProductMissing) => ErrorClass::NotFound,
            Self::Unavailable(_) => ErrorClass::Validation,
            Self::ConcurrentUpdate => ErrorClass::Conflict,
            Self::Store(error) => error.class(),
        }
    }
}
