//! Request Item Return Handler

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
use uuid::Uuid;

use storefront::orders::{ReturnReason, ReturnRequest};

use crate::{
    errors::into_status_error, extensions::*, orders::handlers::order_number,
    orders::models::OrderResponse, state::State,
};

/// Return Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ReturnRequestBody {
    /// `DEFECTIVE`, `WRONG_ITEM`, `DAMAGED`, `SIZE_ISSUE`, `NOT_AS_DESCRIBED`,
    /// `CHANGED_MIND` or `OTHER`. The first three need at least one photo.
    pub reason: String,

    #[serde(default)]
    pub comment: Option<String>,

    /// Photo URLs
    #[serde(default)]
    pub photos: Vec<String>,
}

impl ReturnRequestBody {
    pub(crate) fn into_request(self) -> Result<ReturnRequest, StatusError> {
        let reason = self
            .reason
            .trim()
            .to_ascii_uppercase()
            .parse::<ReturnReason>()
            .or_400("invalid return reason")?;

        Ok(ReturnRequest {
            reason,
            comment: self.comment,
            photos: self.photos,
        })
    }
}

/// Request Item Return Handler
///
/// Returns are accepted for delivered items within the return window.
#[endpoint(
    tags("orders"),
    summary = "Request Item Return",
    responses(
        (status_code = StatusCode::OK, description = "Return requested"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown reason or missing photo"),
        (status_code = StatusCode::NOT_FOUND, description = "Order or item not found"),
        (status_code = StatusCode::CONFLICT, description = "Order was modified concurrently"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Item cannot be returned"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    )
)]
pub(crate) async fn handler(
    order: PathParam<String>,
    item: PathParam<Uuid>,
    json: JsonBody<ReturnRequestBody>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;
    let number = order_number(&order.into_inner())?;
    let request = json.into_inner().into_request()?;
    let item = item.into_inner();

    let order = state
        .app
        .orders
        .request_return(user, &number, item.into(), request)
        .await
        .map_err(into_status_error)?;

    info!(order = %number, item = %item, "return requested");

    Ok(Json(order.into()))
}
