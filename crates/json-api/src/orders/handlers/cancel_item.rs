//! Cancel Order Item Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    errors::into_status_error,
    extensions::*,
    orders::handlers::{cancel::CancelRequest, order_number},
    orders::models::OrderResponse,
    state::State,
};

/// Cancel Order Item Handler
///
/// Only `PENDING` items can be cancelled. The order is cancelled as well once
/// none of its items are left.
#[endpoint(
    tags("orders"),
    summary = "Cancel Order Item",
    responses(
        (status_code = StatusCode::OK, description = "Item cancelled"),
        (status_code = StatusCode::NOT_FOUND, description = "Order or item not found"),
        (status_code = StatusCode::CONFLICT, description = "Order was modified concurrently"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Item is past cancellation"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    )
)]
pub(crate) async fn handler(
    order: PathParam<String>,
    item: PathParam<Uuid>,
    json: JsonBody<CancelRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;
    let number = order_number(&order.into_inner())?;
    let item = item.into_inner();

    let order = state
        .app
        .orders
        .cancel_item(user, &number, item.into(), json.into_inner().reason)
        .await
        .map_err(into_status_error)?;

    info!(order = %number, item = %item, "order item cancelled by user");

    Ok(Json(order.into()))
}
