//! Reject Return Handler

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

use crate::{
    errors::into_status_error, extensions::*, orders::handlers::order_number,
    orders::models::OrderResponse, state::State,
};

/// Reject Return Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RejectReturnRequest {
    /// Shown to the customer; must not be blank
    pub reason: String,
}

/// Reject Return Handler
///
/// A rejected item cannot be returned again.
#[endpoint(
    tags("admin"),
    summary = "Reject Return",
    responses(
        (status_code = StatusCode::OK, description = "Return rejected"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing rejection reason"),
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
    json: JsonBody<RejectReturnRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let number = order_number(&order.into_inner())?;
    let item = item.into_inner();

    let order = state
        .app
        .orders
        .reject_return(&number, item.into(), json.into_inner().reason)
        .await
        .map_err(into_status_error)?;

    info!(order = %number, item = %item, "return rejected");

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use storefront::orders::{ItemStatus, LifecycleError, OrderItemUuid, ReturnInfo, ReturnReason};
    use testresult::TestResult;

    use storefront_app::domain::orders::MockOrdersService;

    use crate::test_helpers::{TEST_ORDER, admin_service, make_order};

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        admin_service(
            orders,
            Router::with_path("admin/orders/{order}/items/{item}/return/reject").post(handler),
        )
    }

    #[tokio::test]
    async fn rejections_carry_the_reason() -> TestResult {
        let item = OrderItemUuid::new();
        let mut order = make_order(item);

        order.items[0].status = ItemStatus::ReturnRejected;
        order.items[0].return_info = Some(ReturnInfo {
            reason: ReturnReason::ChangedMind,
            comment: None,
            photos: Vec::new(),
            requested_at: order.created_at,
            approved_at: None,
            received_at: None,
            rejected_at: Some(order.created_at),
            rejection_reason: Some("Worn outdoors".to_string()),
        });

        let mut orders = MockOrdersService::new();

        orders
            .expect_reject_return()
            .once()
            .withf(move |number, i, reason| {
                number.as_str() == TEST_ORDER && *i == item && reason == "Worn outdoors"
            })
            .return_once(move |_, _, _| Ok(order));

        let mut res = TestClient::post(format!(
            "http://example.com/admin/orders/{TEST_ORDER}/items/{item}/return/reject"
        ))
        .json(&json!({ "reason": "Worn outdoors" }))
        .send(&make_service(orders))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: serde_json::Value = res.take_json().await?;

        assert_eq!(body["items"][0]["status"], "RETURN_REJECTED");
        assert_eq!(
            body["items"][0]["returnInfo"]["rejectionReason"],
            "Worn outdoors"
        );

        Ok(())
    }

    #[tokio::test]
    async fn blank_reasons_return_400() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_reject_return()
            .once()
            .return_once(|_, _, _| Err(LifecycleError::RejectionReasonRequired.into()));

        let res = TestClient::post(format!(
            "http://example.com/admin/orders/{TEST_ORDER}/items/{}/return/reject",
            OrderItemUuid::new()
        ))
        .json(&json!({ "reason": "  " }))
        .send(&make_service(orders))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
