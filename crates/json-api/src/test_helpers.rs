//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use storefront::{
    carts::{Cart, CartLine, CartLineUuid},
    catalog::{InventoryUuid, ProductUuid, VariantUuid},
    checkout::OrderPricing,
    customers::UserUuid,
    orders::{
        CustomerSnapshot, ItemStatus, Order, OrderItem, OrderItemUuid, OrderNumber, OrderStatus,
        OrderUuid, Payment, PaymentMethod, PaymentStatus, ShippingAddress, StatusChange,
    },
};
use storefront_app::{
    context::AppContext,
    domain::{
        carts::MockCartsService, checkout::MockCheckoutService,
        maintenance::MockMaintenanceService, orders::MockOrdersService,
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER: UserUuid =
    UserUuid::from_uuid(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0001));

pub(crate) const TEST_ORDER: &str = "ORD-20260301-A1B2C3";

#[salvo::handler]
pub(crate) async fn inject_user(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_user_uuid(TEST_USER);
    ctrl.call_next(req, depot, res).await;
}

fn strict_carts_mock() -> MockCartsService {
    let mut carts = MockCartsService::new();

    carts.expect_view_cart().never();
    carts.expect_add_item().never();
    carts.expect_update_quantity().never();
    carts.expect_remove_item().never();
    carts.expect_clear_cart().never();

    carts
}

fn strict_checkout_mock() -> MockCheckoutService {
    let mut checkout = MockCheckoutService::new();

    checkout.expect_place_order().never();

    checkout
}

fn strict_orders_mock() -> MockOrdersService {
    let mut orders = MockOrdersService::new();

    orders.expect_get_order().never();
    orders.expect_list_orders().never();
    orders.expect_cancel_item().never();
    orders.expect_cancel_order().never();
    orders.expect_request_return().never();
    orders.expect_request_order_return().never();
    orders.expect_get_order_admin().never();
    orders.expect_update_status().never();
    orders.expect_approve_return().never();
    orders.expect_reject_return().never();

    orders
}

fn strict_maintenance_mock() -> MockMaintenanceService {
    let mut maintenance = MockMaintenanceService::new();

    maintenance.expect_expire_offers().never();

    maintenance
}

fn state(
    carts: MockCartsService,
    checkout: MockCheckoutService,
    orders: MockOrdersService,
) -> Arc<State> {
    State::from_app_context(AppContext {
        carts: Arc::new(carts),
        checkout: Arc::new(checkout),
        orders: Arc::new(orders),
        maintenance: Arc::new(strict_maintenance_mock()),
    })
}

fn user_service(state: Arc<State>, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state))
            .hoop(inject_user)
            .push(route),
    )
}

pub(crate) fn carts_service(carts: MockCartsService, route: Router) -> Service {
    user_service(
        state(carts, strict_checkout_mock(), strict_orders_mock()),
        route,
    )
}

pub(crate) fn checkout_service(checkout: MockCheckoutService, route: Router) -> Service {
    user_service(
        state(strict_carts_mock(), checkout, strict_orders_mock()),
        route,
    )
}

pub(crate) fn orders_service(orders: MockOrdersService, route: Router) -> Service {
    user_service(
        state(strict_carts_mock(), strict_checkout_mock(), orders),
        route,
    )
}

/// Admin routes carry no user identity.
pub(crate) fn admin_service(orders: MockOrdersService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(
                strict_carts_mock(),
                strict_checkout_mock(),
                orders,
            )))
            .push(route),
    )
}

/// A cart holding two pairs of one shoe at ₹1600.
pub(crate) fn make_cart(inventory: InventoryUuid) -> Cart {
    let mut cart = Cart::new(TEST_USER, Timestamp::UNIX_EPOCH);

    cart.lines.push(CartLine {
        uuid: CartLineUuid::new(),
        product_uuid: ProductUuid::new(),
        variant_uuid: VariantUuid::new(),
        inventory_uuid: inventory,
        quantity: 2,
        price_at_add: 1600,
        offer_percent_at_add: 20,
    });
    cart.recompute_totals();

    cart
}

pub(crate) fn test_order_number() -> OrderNumber {
    OrderNumber::parse(TEST_ORDER).unwrap_or_else(|error| unreachable!("{error}"))
}

/// A pending cash-on-delivery order with a single item.
pub(crate) fn make_order(item: OrderItemUuid) -> Order {
    let placed_at = Timestamp::UNIX_EPOCH;

    Order {
        uuid: OrderUuid::new(),
        number: test_order_number(),
        user_uuid: TEST_USER,
        customer: CustomerSnapshot {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
        },
        shipping_address: ShippingAddress {
            full_name: "Asha Menon".to_string(),
            phone: "9800000000".to_string(),
            street_address: "12 Marine Drive".to_string(),
            city: "Kochi".to_string(),
            state: "Kerala".to_string(),
            pincode: "682031".to_string(),
            country: "India".to_string(),
        },
        payment: Payment {
            method: PaymentMethod::Cod,
            status: PaymentStatus::Pending,
            refunded_amount: 0,
        },
        status: OrderStatus::Pending,
        pricing: OrderPricing {
            subtotal: 3200,
            tax: 576,
            tax_percent: 18,
            shipping_charge: 0,
            discount: 0,
            total_amount: 3776,
        },
        items: vec![OrderItem {
            uuid: item,
            product_uuid: ProductUuid::new(),
            variant_uuid: VariantUuid::new(),
            inventory_uuid: InventoryUuid::new(),
            product_name: "Runner".to_string(),
            color: "Black".to_string(),
            size: "9".to_string(),
            sku: "RUN-BLK-9".to_string(),
            image: Some("runner-black.jpg".to_string()),
            quantity: 2,
            unit_price: 1600,
            line_total: 3200,
            status: ItemStatus::Pending,
            timeline: vec![StatusChange {
                status: ItemStatus::Pending,
                at: placed_at,
            }],
            cancellation: None,
            return_info: None,
        }],
        created_at: placed_at,
        updated_at: placed_at,
        delivered_at: None,
        cancelled_at: None,
    }
}
