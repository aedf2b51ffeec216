//! Order Handlers

use salvo::prelude::StatusError;
use storefront::orders::OrderNumber;

use crate::extensions::*;

pub(crate) mod cancel;
pub(crate) mod cancel_item;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod return_item;
pub(crate) mod return_order;

/// Parse the `{order}` path segment.
pub(crate) fn order_number(value: &str) -> Result<OrderNumber, StatusError> {
    OrderNumber::parse(value).or_400("invalid order number")
}
