//! Admin Get Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    errors::into_status_error, extensions::*, orders::handlers::order_number,
    orders::models::OrderResponse, state::State,
};

/// Admin Get Order Handler
#[endpoint(
    tags("admin"),
    summary = "Get Any Order",
    responses(
        (status_code = StatusCode::OK, description = "Order"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    )
)]
pub(crate) async fn handler(
    order: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let number = order_number(&order.into_inner())?;

    let order = state
        .app
        .orders
        .get_order_admin(&number)
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use storefront::orders::OrderItemUuid;
    use testresult::TestResult;

    use storefront_app::domain::orders::{MockOrdersService, OrdersServiceError};

    use crate::test_helpers::{TEST_ORDER, admin_service, make_order};

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        admin_service(
            orders,
            Router::with_path("admin/orders/{order}").get(handler),
        )
    }

    #[tokio::test]
    async fn admins_see_any_order() -> TestResult {
        let order = make_order(OrderItemUuid::new());

        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order_admin()
            .once()
            .withf(|number| number.as_str() == TEST_ORDER)
            .return_once(move |_| Ok(order));

        let response: OrderResponse =
            TestClient::get(format!("http://example.com/admin/orders/{TEST_ORDER}"))
                .send(&make_service(orders))
                .await
                .take_json()
                .await?;

        assert_eq!(response.order_id, TEST_ORDER);
        assert_eq!(response.customer.email, "asha@example.com");

        Ok(())
    }

    #[tokio::test]
    async fn missing_orders_return_404() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order_admin()
            .once()
            .return_once(|_| Err(OrdersServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/admin/orders/{TEST_ORDER}"))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
