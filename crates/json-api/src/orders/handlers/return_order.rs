//! Request Order Return Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use tracing::info;

use crate::{
    errors::into_status_error,
    extensions::*,
    orders::handlers::{order_number, return_item::ReturnRequestBody},
    orders::models::OrderResponse,
    state::State,
};

/// Request Order Return Handler
///
/// Requests a return, with the same reason, for every item that is still
/// eligible. Fails when none is.
#[endpoint(
    tags("orders"),
    summary = "Request Order Return",
    responses(
        (status_code = StatusCode::OK, description = "Returns requested"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown reason or missing photo"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order was modified concurrently"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "No item can be returned"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    )
)]
pub(crate) async fn handler(
    order: PathParam<String>,
    json: JsonBody<ReturnRequestBody>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;
    let number = order_number(&order.into_inner())?;
    let request = json.into_inner().into_request()?;

    let order = state
        .app
        .orders
        .request_order_return(user, &number, request)
        .await
        .map_err(into_status_error)?;

    info!(order = %number, "return requested for whole order");

    Ok(Json(order.into()))
}
