//! Checkout errors.

use storefront::{
    checkout::LineProblem,
    errors::{Classify, ErrorClass},
    reconcile::CartChange,
};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CouponError {
    #[error("coupon not found")]
    NotFound,

    #[error("coupon is not active")]
    Inactive,

    #[error("coupon has expired")]
    Expired,

    #[error("minimum purchase of ₹{min_purchase} required for this coupon")]
    MinimumNotMet { min_purchase: u64 },
}

impl Classify for CouponError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound => ErrorClass::NotFound,
            Self::Inactive | Self::Expired | Self::MinimumNotMet { .. } => ErrorClass::Validation,
        }
    }
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Only Cash on Delivery is supported currently")]
    UnsupportedPaymentMethod,

    #[error("address not found")]
    AddressNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("cart is empty")]
    EmptyCart,

    /// Reconciliation repaired the cart; it must be shown again before ordering.
    #[error("cart has changed, please review it before placing the order")]
    CartChanged(Vec<CartChange>),

    #[error(transparent)]
    Line(#[from] LineProblem),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error("could not allocate a unique order number")]
    OrderNumberExhausted,

    #[error("cart was modified concurrently")]
    ConcurrentUpdate,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CheckoutError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::StaleWrite => Self::ConcurrentUpdate,
            other => Self::Store(other),
        }
    }
}

impl Classify for CheckoutError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedPaymentMethod | Self::EmptyCart => ErrorClass::Validation,
            Self::AddressNotFound | Self::UserNotFound => ErrorClass::NotFound,
            Self::CartChanged(_) | Self::ConcurrentUpdate => ErrorClass::Conflict,
            Self::Line(problem) => problem.class(),
            Self::Coupon(error) => error.class(),
            Self::OrderNumberExhausted => ErrorClass::Internal,
            Self::Store(error) => error.class(),
        }
    }
}
