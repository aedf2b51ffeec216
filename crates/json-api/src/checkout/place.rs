//! Place Order Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront::{
    errors::{Classify, ErrorClass},
    orders::PaymentMethod,
};
use storefront_app::domain::checkout::{CheckoutError, PlaceOrder, PlacedOrder};

use crate::{
    cart::models::ChangeResponse,
    errors::into_status_error,
    extensions::*,
    observability::{CheckoutOutcome, observe_checkout},
    orders::models::OrderResponse,
    state::State,
};

/// Place Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaceOrderRequest {
    /// One of the caller's saved addresses
    pub address_uuid: Uuid,

    /// Only `COD` can currently be placed
    pub payment_method: String,

    #[serde(default)]
    pub coupon_code: Option<String>,
}

impl PlaceOrderRequest {
    fn into_place_order(self) -> Result<PlaceOrder, StatusError> {
        let payment_method = self
            .payment_method
            .trim()
            .to_ascii_uppercase()
            .parse::<PaymentMethod>()
            .or_400("invalid payment method")?;

        Ok(PlaceOrder {
            address_uuid: self.address_uuid.into(),
            payment_method,
            coupon_code: self
                .coupon_code
                .map(|code| code.trim().to_string())
                .filter(|code| !code.is_empty()),
        })
    }
}

/// Placed Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlacedOrderResponse {
    pub order_id: String,
    pub total_amount: u64,
    pub order_date: String,
    pub order: OrderResponse,
}

impl From<PlacedOrder> for PlacedOrderResponse {
    fn from(placed: PlacedOrder) -> Self {
        Self {
            order_id: placed.order_id.to_string(),
            total_amount: placed.total_amount,
            order_date: placed.order_date.to_string(),
            order: placed.order.into(),
        }
    }
}

/// Cart Changed Response
///
/// Returned instead of an order when reconciliation adjusted the cart.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartChangedResponse {
    pub message: String,
    pub changes: Vec<ChangeResponse>,
}

fn outcome(error: &CheckoutError) -> CheckoutOutcome {
    match error {
        CheckoutError::CartChanged(_) => CheckoutOutcome::CartChanged,
        other if other.class() == ErrorClass::Conflict => CheckoutOutcome::StockConflict,
        _ => CheckoutOutcome::Rejected,
    }
}

/// Place Order Handler
///
/// Reconciles the cart, reserves stock line by line and records the order.
/// When reconciliation changes the cart nothing is ordered and the changes
/// are returned with a 409 so the customer can review them.
#[endpoint(
    tags("checkout"),
    summary = "Place Order",
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed", body = PlacedOrderResponse),
        (status_code = StatusCode::BAD_REQUEST, description = "Unsupported payment method, empty cart or invalid coupon"),
        (status_code = StatusCode::NOT_FOUND, description = "Address or coupon not found"),
        (status_code = StatusCode::CONFLICT, description = "Cart changed or stock ran out", body = CartChangedResponse),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<PlaceOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;
    let request = json.into_inner().into_place_order()?;

    match state.app.checkout.place_order(user, request).await {
        Ok(placed) => {
            observe_checkout(CheckoutOutcome::Placed);

            res.add_header(LOCATION, format!("/orders/{}", placed.order_id), true)
                .or_500("failed to set location header")?;
            res.render(Json(PlacedOrderResponse::from(placed)));

            Ok(StatusCode::CREATED)
        }
        Err(error) => {
            observe_checkout(outcome(&error));

            let message = error.to_string();

            let CheckoutError::CartChanged(changes) = error else {
                return Err(into_status_error(error));
            };

            res.render(Json(CartChangedResponse {
                message,
                changes: changes.into_iter().map(ChangeResponse::from).collect(),
            }));

            Ok(StatusCode::CONFLICT)
        }
    }
}
