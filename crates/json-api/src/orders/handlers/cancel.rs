//! Cancel Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    errors::into_status_error, extensions::*, orders::handlers::order_number,
    orders::models::OrderResponse, state::State,
};

/// Cancel Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct CancelRequest {
    /// Shown to the customer; a default is recorded when omitted
    #[serde(default)]
    pub reason: Option<String>,
}

/// Cancel Order Handler
///
/// Cancels every item that has not shipped yet and restocks it.
#[endpoint(
    tags("orders"),
    summary = "Cancel Order",
    responses(
        (status_code = StatusCode::OK, description = "Order cancelled"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order was modified concurrently"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Nothing left to cancel"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    )
)]
pub(crate) async fn handler(
    order: PathParam<String>,
    json: JsonBody<CancelRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;
    let number = order_number(&order.into_inner())?;

    let order = state
        .app
        .orders
        .cancel_order(user, &number, json.into_inner().reason)
        .await
        .map_err(into_status_error)?;

    info!(order = %number, status = %order.status, "order cancelled by user");

    Ok(Json(order.into()))
}
