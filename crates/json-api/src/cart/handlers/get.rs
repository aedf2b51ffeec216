//! Get Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    cart::models::CartViewResponse, errors::into_status_error, extensions::*, state::State,
};

/// Get Cart Handler
///
/// Returns the caller's cart after reconciling it against the live catalog.
/// Lines whose product disappeared or ran out of stock are dropped, quantities
/// are clamped to stock and prices refreshed; `changes` lists what happened.
#[endpoint(
    tags("cart"),
    summary = "Get Cart",
    responses(
        (status_code = StatusCode::OK, description = "Reconciled cart"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing user identity"),
        (status_code = StatusCode::CONFLICT, description = "Cart was modified concurrently"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartViewResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;

    let reconciliation = state
        .app
        .carts
        .view_cart(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(reconciliation.into()))
}
