//! Checkout

pub(crate) mod place;
