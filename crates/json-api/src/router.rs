//! App Router

use salvo::Router;

use crate::{admin, cart, checkout, identity::middleware, orders};

/// Routes for customers, identified by `x-user-uuid`, and for admins.
pub(crate) fn app_router() -> Router {
    Router::new()
        .push(
            Router::new()
                .hoop(middleware::require_user)
                .push(
                    Router::with_path("cart")
                        .get(cart::handlers::get::handler)
                        .delete(cart::handlers::clear::handler)
                        .push(
                            Router::with_path("items")
                                .post(cart::handlers::add_item::handler)
                                .push(
                                    Router::with_path("{inventory}")
                                        .patch(cart::handlers::update_item::handler)
                                        .delete(cart::handlers::remove_item::handler),
                                ),
                        ),
                )
                .push(Router::with_path("checkout").post(checkout::place::handler))
                .push(
                    Router::with_path("orders")
                        .get(orders::handlers::index::handler)
                        .push(
                            Router::with_path("{order}")
                                .get(orders::handlers::get::handler)
                                .push(
                                    Router::with_path("cancel")
                                        .post(orders::handlers::cancel::handler),
                                )
                                .push(
                                    Router::with_path("return")
                                        .post(orders::handlers::return_order::handler),
                                )
                                .push(
                                    Router::with_path("items/{item}")
                                        .push(
                                            Router::with_path("cancel")
                                                .post(orders::handlers::cancel_item::handler),
                                        )
                                        .push(
                                            Router::with_path("return")
                                                .post(orders::handlers::return_item::handler),
                                        ),
                                ),
                        ),
                ),
        )
        .push(
            Router::with_path("admin/orders/{order}")
                .hoop(middleware::require_admin)
                .get(admin::handlers::get::handler)
                .push(Router::with_path("status").put(admin::handlers::update_status::handler))
                .push(
                    Router::with_path("items/{item}/return")
                        .push(
                            Router::with_path("approve")
                                .post(admin::handlers::approve_return::handler),
                        )
                        .push(
                            Router::with_path("reject")
                                .post(admin::handlers::reject_return::handler),
                        ),
                ),
        )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use salvo::{
        affix_state::inject,
        http::StatusCode,
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use serde_json::{Value, json};
    use storefront_app::{
        context::{AppContext, Policies},
        store::demo::{
            DEMO_ADDRESS, DEMO_COUPON, DEMO_INVENTORY, DEMO_PRODUCT, DEMO_USER, DEMO_VARIANT,
        },
    };
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::{
        identity::{USER_ROLE_HEADER, USER_UUID_HEADER},
        state::State,
    };

    use super::*;

    async fn demo_service() -> TestResult<Service> {
        let app = AppContext::in_memory(Policies::default()).await?;

        Ok(Service::new(
            Router::new()
                .hoop(inject(Arc::new(State::new(app))))
                .push(app_router()),
        ))
    }

    #[tokio::test]
    async fn user_routes_require_an_identity() -> TestResult {
        let res = TestClient::get("http://example.com/cart")
            .send(&demo_service().await?)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn admin_routes_require_the_admin_role() -> TestResult {
        let res = TestClient::get("http://example.com/admin/orders/ORD-20260301-A1B2C3")
            .add_header(USER_UUID_HEADER, Uuid::now_v7().to_string(), true)
            .send(&demo_service().await?)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn unknown_admin_orders_are_not_found() -> TestResult {
        let res = TestClient::get("http://example.com/admin/orders/ORD-20260301-A1B2C3")
            .add_header(USER_ROLE_HEADER, "admin", true)
            .send(&demo_service().await?)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn demo_customer_can_order_and_cancel() -> TestResult {
        let service = demo_service().await?;
        let user = DEMO_USER.to_string();

        let res = TestClient::post("http://example.com/cart/items")
            .add_header(USER_UUID_HEADER, &user, true)
            .json(&json!({
                "productUuid": DEMO_PRODUCT,
                "variantUuid": DEMO_VARIANT,
                "inventoryUuid": DEMO_INVENTORY,
                "quantity": 2,
            }))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        let mut res = TestClient::get("http://example.com/cart")
            .add_header(USER_UUID_HEADER, &user, true)
            .send(&service)
            .await;

        let cart: Value = res.take_json().await?;

        assert_eq!(cart["hasChanges"], false);
        assert_eq!(cart["cart"]["totalAmount"], 3200);

        let mut res = TestClient::post("http://example.com/checkout")
            .add_header(USER_UUID_HEADER, &user, true)
            .json(&json!({
                "addressUuid": DEMO_ADDRESS,
                "paymentMethod": "COD",
                "couponCode": DEMO_COUPON,
            }))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        let placed: Value = res.take_json().await?;
        let order_id = placed["orderId"].as_str().unwrap_or_default().to_string();

        assert_eq!(placed["totalAmount"], 3200 + 576 - 320);

        let mut res = TestClient::get("http://example.com/cart")
            .add_header(USER_UUID_HEADER, &user, true)
            .send(&service)
            .await;

        let cart: Value = res.take_json().await?;

        assert_eq!(cart["cart"]["totalItems"], 0);

        let mut res = TestClient::post(format!("http://example.com/orders/{order_id}/cancel"))
            .add_header(USER_UUID_HEADER, &user, true)
            .json(&json!({}))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let order: Value = res.take_json().await?;

        assert_eq!(order["status"], "CANCELLED");
        assert_eq!(order["items"][0]["cancellation"]["reason"], "Cancelled by user");

        let res = TestClient::get(format!("http://example.com/orders/{order_id}"))
            .add_header(USER_UUID_HEADER, Uuid::now_v7().to_string(), true)
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
