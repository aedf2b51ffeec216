//! Orders service errors.

use storefront::{
    errors::{Classify, ErrorClass},
    orders::LifecycleError,
};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("order was modified concurrently, please retry")]
    ConcurrentUpdate,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for OrdersServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::StaleWrite => Self::ConcurrentUpdate,
            StoreError::NotFound => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

impl Classify for OrdersServiceError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound => ErrorClass::NotFound,
            Self::Lifecycle(error) => error.class(),
            Self::ConcurrentUpdate => ErrorClass::Conflict,
            Self::Store(error) => error.class(),
        }
    }
}
