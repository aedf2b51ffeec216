//! Update Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront::carts::QuantityAction;

use crate::{
    cart::models::CartResponse, errors::into_status_error, extensions::*, state::State,
};

/// Single-step quantity change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum QuantityStep {
    Increment,
    Decrement,
}

impl From<QuantityStep> for QuantityAction {
    fn from(step: QuantityStep) -> Self {
        match step {
            QuantityStep::Increment => QuantityAction::Increment,
            QuantityStep::Decrement => QuantityAction::Decrement,
        }
    }
}

/// Update Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateCartItemRequest {
    pub action: QuantityStep,
}

/// Update Cart Item Handler
///
/// Steps the quantity of the line holding `inventory` up or down by one.
#[endpoint(
    tags("cart"),
    summary = "Change Cart Item Quantity",
    responses(
        (status_code = StatusCode::OK, description = "Quantity changed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Limit, stock or minimum reached"),
        (status_code = StatusCode::NOT_FOUND, description = "Item not in cart"),
        (status_code = StatusCode::CONFLICT, description = "Cart was modified concurrently"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    inventory: PathParam<Uuid>,
    json: JsonBody<UpdateCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;

    let cart = state
        .app
        .carts
        .update_quantity(
            user,
            inventory.into_inner().into(),
            json.into_inner().action.into(),
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
