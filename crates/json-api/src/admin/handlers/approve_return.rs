//! Approve Return Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{
    errors::into_status_error, extensions::*, orders::handlers::order_number,
    orders::models::OrderResponse, state::State,
};

/// Approve Return Handler
///
/// Marks the item `RETURNED` and restocks it. On a paid order the line total
/// is added to the refunded amount.
#[endpoint(
    tags("admin"),
    summary = "Approve Return",
    responses(
        (status_code = StatusCode::OK, description = "Return approved"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::NOT_FOUND, description = "Order or item not found"),
        (status_code = StatusCode::CONFLICT, description = "Order was modified concurrently"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "No return requested"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    )
)]
pub(crate) async fn handler(
    order: PathParam<String>,
    item: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let number = order_number(&order.into_inner())?;
    let item = item.into_inner();

    let order = state
        .app
        .orders
        .approve_return(&number, item.into())
        .await
        .map_err(into_status_error)?;

    info!(order = %number, item = %item, "return approved");

    Ok(Json(order.into()))
}
