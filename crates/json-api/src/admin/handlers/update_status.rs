//! Update Order Status Handler

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

use storefront::orders::OrderStatus;

use crate::{
    errors::into_status_error, extensions::*, orders::handlers::order_number,
    orders::models::OrderResponse, state::State,
};

/// Update Order Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateStatusRequest {
    /// `SHIPPED`, `OUT_FOR_DELIVERY`, `DELIVERED` or `CANCELLED`
    pub status: String,
}

/// Update Order Status Handler
///
/// Moves the order and every item still in step with it forward.
/// `PENDING → SHIPPED → OUT_FOR_DELIVERY → DELIVERED`, or `PENDING →
/// CANCELLED`, which restocks the pending items.
#[endpoint(
    tags("admin"),
    summary = "Update Order Status",
    responses(
        (status_code = StatusCode::OK, description = "Status updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order was modified concurrently"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Transition not allowed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    )
)]
pub(crate) async fn handler(
    order: PathParam<String>,
    json: JsonBody<UpdateStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let number = order_number(&order.into_inner())?;
    let status = json
        .into_inner()
        .status
        .trim()
        .to_ascii_uppercase()
        .parse::<OrderStatus>()
        .or_400("invalid order status")?;

    let order = state
        .app
        .orders
        .update_status(&number, status)
        .await
        .map_err(into_status_error)?;

    info!(order = %number, status = %order.status, "order status updated");

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use storefront::orders::{LifecycleError, OrderItemUuid};
    use testresult::TestResult;

    use storefront_app::domain::orders::MockOrdersService;

    use crate::test_helpers::{TEST_ORDER, admin_service, make_order};

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        admin_service(
            orders,
            Router::with_path("admin/orders/{order}/status").put(handler),
        )
    }

    #[tokio::test]
    async fn status_updates_are_forwarded() -> TestResult {
        let mut order = make_order(OrderItemUuid::new());
        order.status = OrderStatus::Shipped;

        let mut orders = MockOrdersService::new();

        orders
            .expect_update_status()
            .once()
            .withf(|number, status| {
                number.as_str() == TEST_ORDER && *status == OrderStatus::Shipped
            })
            .return_once(move |_, _| Ok(order));

        let mut res = TestClient::put(format!(
            "http://example.com/admin/orders/{TEST_ORDER}/status"
        ))
        .json(&json!({ "status": "SHIPPED" }))
        .send(&make_service(orders))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(body.status, "SHIPPED");

        Ok(())
    }

    #[tokio::test]
    async fn skipped_steps_return_422_naming_both_statuses() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_update_status()
            .once()
            .return_once(|_, _| {
                Err(LifecycleError::InvalidTransition {
                    from: OrderStatus::Pending,
                    to: OrderStatus::Delivered,
                }
                .into())
            });

        let mut res = TestClient::put(format!(
            "http://example.com/admin/orders/{TEST_ORDER}/status"
        ))
        .json(&json!({ "status": "DELIVERED" }))
        .send(&make_service(orders))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        let body = res.take_string().await?;

        assert!(
            body.contains("cannot change status from PENDING to DELIVERED"),
            "expected both statuses in the error, got {body}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unknown_statuses_return_400() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_update_status().never();

        let res = TestClient::put(format!(
            "http://example.com/admin/orders/{TEST_ORDER}/status"
        ))
        .json(&json!({ "status": "LOST" }))
        .send(&make_service(orders))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
