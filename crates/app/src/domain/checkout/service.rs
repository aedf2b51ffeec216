//! Checkout service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use serde::Serialize;
use storefront::{
    catalog::InventoryUuid,
    checkout::{
        CheckoutPolicy, LineProblem, OrderPricing, ValidatedLine, coupon_discount, validate_lines,
    },
    customers::{AddressUuid, UserUuid},
    orders::{NewOrder, Order, OrderNumber, PaymentMethod},
};
use tracing::{error, info, warn};

use crate::{
    domain::{
        carts::reconciler::reconcile_stored,
        checkout::errors::{CheckoutError, CouponError},
    },
    store::{Coupon, StockUpdate, StoreError, Stores},
};

/// Attempts at inserting an order before giving up on number collisions.
const ORDER_NUMBER_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrder {
    pub address_uuid: AddressUuid,
    pub payment_method: PaymentMethod,
    pub coupon_code: Option<String>,
}

/// Summary returned to the checkout UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: OrderNumber,
    pub total_amount: u64,
    pub order_date: Timestamp,
    pub order: Order,
}

/// Validate `coupon` against `subtotal`, returning the discount it grants.
///
/// # Errors
///
/// Returns a [`CouponError`] when the coupon is inactive, expired, or the
/// subtotal is below its minimum purchase.
pub fn apply_coupon(coupon: &Coupon, subtotal: u64, now: Timestamp) -> Result<u64, CouponError> {
    if !coupon.is_active {
        return Err(CouponError::Inactive);
    }

    if coupon.expires_at <= now {
        return Err(CouponError::Expired);
    }

    if subtotal < coupon.min_purchase {
        return Err(CouponError::MinimumNotMet {
            min_purchase: coupon.min_purchase,
        });
    }

    Ok(coupon_discount(subtotal, coupon.percent, coupon.max_discount))
}

#[derive(Debug, Clone)]
pub struct StoreCheckoutService {
    stores: Stores,
    policy: CheckoutPolicy,
}

impl StoreCheckoutService {
    #[must_use]
    pub fn new(stores: Stores, policy: CheckoutPolicy) -> Self {
        Self { stores, policy }
    }

    async fn discount(
        &self,
        code: Option<&str>,
        subtotal: u64,
        now: Timestamp,
    ) -> Result<u64, CheckoutError> {
        let Some(code) = code.map(str::trim).filter(|code| !code.is_empty()) else {
            return Ok(0);
        };

        let coupon = self
            .stores
            .coupons
            .find_coupon(code)
            .await?
            .ok_or(CouponError::NotFound)?;

        Ok(apply_coupon(&coupon, subtotal, now)?)
    }

    /// Take stock for every line in order. On any failure the stock already
    /// taken is put back before the error is returned.
    async fn reserve(&self, lines: &[ValidatedLine<'_>]) -> Result<(), CheckoutError> {
        let mut reserved: Vec<(InventoryUuid, u32)> = Vec::with_capacity(lines.len());

        for line in lines {
            let inventory = line.catalog.inventory;
            let quantity = line.line.quantity;

            let failure = match self.stores.inventory.decrement(inventory.uuid, quantity).await {
                Ok(StockUpdate::Reserved { .. }) => {
                    reserved.push((inventory.uuid, quantity));
                    continue;
                }
                Ok(StockUpdate::Insufficient { available }) => {
                    warn!(
                        inventory = %inventory.uuid,
                        requested = quantity,
                        available,
                        "stock conflict during checkout"
                    );

                    CheckoutError::Line(LineProblem::InsufficientStock {
                        product_name: line.catalog.product.name.clone(),
                        size: inventory.size.clone(),
                        color: line.catalog.variant.color.clone(),
                        available,
                    })
                }
                Err(error) => CheckoutError::from(error),
            };

            self.release(&reserved).await;

            return Err(failure);
        }

        Ok(())
    }

    async fn release(&self, reserved: &[(InventoryUuid, u32)]) {
        for &(inventory, quantity) in reserved {
            if let Err(source) = self.stores.inventory.increment(inventory, quantity).await {
                error!(
                    inventory = %inventory,
                    quantity,
                    error = %source,
                    "failed to release reserved stock"
                );
            }
        }
    }

    async fn insert(&self, order: &mut Order) -> Result<(), StoreError> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.stores.orders.insert_order(order).await {
                Err(StoreError::AlreadyExists) if attempts < ORDER_NUMBER_ATTEMPTS => {
                    warn!(order = %order.number, "order number collision, retrying");
                    order.renumber();
                }
                result => return result,
            }
        }
    }
}

#[async_trait]
impl CheckoutService for StoreCheckoutService {
    async fn place_order(
        &self,
        user: UserUuid,
        request: PlaceOrder,
    ) -> Result<PlacedOrder, CheckoutError> {
        let now = Timestamp::now();

        if request.payment_method != PaymentMethod::Cod {
            return Err(CheckoutError::UnsupportedPaymentMethod);
        }

        let address = self
            .stores
            .customers
            .find_address(user, request.address_uuid)
            .await?
            .filter(|address| address.is_usable_by(user))
            .ok_or(CheckoutError::AddressNotFound)?;

        let customer = self
            .stores
            .customers
            .find_user(user)
            .await?
            .ok_or(CheckoutError::UserNotFound)?;

        let reconciled = reconcile_stored(&self.stores, user, now)
            .await?
            .ok_or(CheckoutError::EmptyCart)?;

        if reconciled.reconciliation.has_changes() {
            info!(
                user = %user,
                changes = reconciled.reconciliation.changes.len(),
                "checkout aborted, cart changed"
            );

            return Err(CheckoutError::CartChanged(
                reconciled.reconciliation.changes,
            ));
        }

        let mut cart = reconciled.reconciliation.cart;

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut order = {
            let lines = validate_lines(&cart, &reconciled.catalog, now)?;

            let subtotal = lines.iter().map(ValidatedLine::line_total).sum();
            let discount = self
                .discount(request.coupon_code.as_deref(), subtotal, now)
                .await?;
            let pricing = OrderPricing::compute(subtotal, discount, &self.policy);

            self.reserve(&lines).await?;

            Order::place(&NewOrder {
                user: &customer,
                address: &address,
                method: request.payment_method,
                lines: &lines,
                pricing,
                now,
            })
        };

        if let Err(source) = self.insert(&mut order).await {
            let reserved: Vec<(InventoryUuid, u32)> = order
                .items
                .iter()
                .map(|item| (item.inventory_uuid, item.quantity))
                .collect();

            self.release(&reserved).await;

            return Err(match source {
                StoreError::AlreadyExists => CheckoutError::OrderNumberExhausted,
                other => CheckoutError::from(other),
            });
        }

        info!(
            user = %user,
            order = %order.number,
            total = order.pricing.total_amount,
            "order placed"
        );

        cart.clear();
        cart.touch(now);

        if let Err(source) = self.stores.carts.save_cart(&cart).await {
            error!(
                user = %user,
                order = %order.number,
                error = %source,
                "failed to empty cart after placing order"
            );
        }

        Ok(PlacedOrder {
            order_id: order.number.clone(),
            total_amount: order.pricing.total_amount,
            order_date: order.created_at,
            order,
        })
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Turn the user's cart into an order.
    ///
    /// The cart is reconciled first and checkout stops with
    /// [`CheckoutError::CartChanged`] if that altered it. Stock is taken line
    /// by line; when any line cannot be satisfied nothing is ordered and the
    /// stock already taken is restored.
    async fn place_order(
        &self,
        user: UserUuid,
        request: PlaceOrder,
    ) -> Result<PlacedOrder, CheckoutError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use storefront::{
        errors::{Classify, ErrorClass},
        orders::{ItemStatus, OrderStatus, PaymentStatus},
        reconcile::ChangeKind,
    };
    use testresult::TestResult;

    use crate::{
        domain::carts::CartsService,
        store::{CartsRepository, MockInventoryRepository, OrdersRepository},
        test::fixtures::Storefront,
    };

    use super::*;

    fn cod(shop: &Storefront) -> PlaceOrder {
        PlaceOrder {
            address_uuid: shop.address,
            payment_method: PaymentMethod::Cod,
            coupon_code: None,
        }
    }

    #[tokio::test]
    async fn place_order_snapshots_cart_and_takes_stock() -> TestResult {
        let shop = Storefront::seed().await;
        shop.carts_service()
            .add_item(shop.user, shop.new_item(2))
            .await?;

        let placed = shop.checkout_service().place_order(shop.user, cod(&shop)).await?;

        assert_eq!(placed.order.status, OrderStatus::Pending);
        assert_eq!(placed.order.payment.status, PaymentStatus::Pending);
        assert_eq!(placed.order.pricing.subtotal, 3200);
        assert_eq!(placed.order.pricing.tax, 576);
        assert_eq!(placed.total_amount, 3776);
        assert_eq!(placed.order.customer.name, "Asha");
        assert_eq!(placed.order.shipping_address.city, "Kochi");

        let item = placed.order.items.first().ok_or("order has no items")?;
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.timeline.len(), 1);
        assert_eq!(item.sku, "RUN-BLK-9");

        assert_eq!(shop.store.stock(shop.inventory).await, Some(3));

        let cart = shop.store.find_cart(shop.user).await?.ok_or("cart missing")?;
        assert!(cart.is_empty());

        let stored = shop.store.find_order(&placed.order_id).await?;
        assert_eq!(stored.as_ref(), Some(&placed.order));

        Ok(())
    }

    #[tokio::test]
    async fn place_order_rejects_other_payment_methods() -> TestResult {
        let shop = Storefront::seed().await;

        let mut request = cod(&shop);
        request.payment_method = PaymentMethod::Razorpay;

        let result = shop.checkout_service().place_order(shop.user, request).await;

        assert!(
            matches!(result, Err(CheckoutError::UnsupportedPaymentMethod)),
            "expected UnsupportedPaymentMethod, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn place_order_rejects_deleted_addresses() -> TestResult {
        let shop = Storefront::seed().await;
        shop.delete_address().await;

        let result = shop
            .checkout_service()
            .place_order(shop.user, cod(&shop))
            .await;

        assert!(
            matches!(result, Err(CheckoutError::AddressNotFound)),
            "expected AddressNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn place_order_without_cart_is_empty_cart() -> TestResult {
        let shop = Storefront::seed().await;

        let result = shop
            .checkout_service()
            .place_order(shop.user, cod(&shop))
            .await;

        assert!(
            matches!(result, Err(CheckoutError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn place_order_aborts_when_reconciliation_changes_the_cart() -> TestResult {
        let shop = Storefront::seed().await;
        shop.carts_service()
            .add_item(shop.user, shop.new_item(1))
            .await?;

        shop.set_base_price(2500).await;

        let result = shop
            .checkout_service()
            .place_order(shop.user, cod(&shop))
            .await;

        let Err(CheckoutError::CartChanged(changes)) = result else {
            panic!("expected CartChanged, got {result:?}");
        };

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::PriceUpdated);
        assert_eq!(shop.store.order_count().await, 0);
        assert_eq!(shop.store.stock(shop.inventory).await, Some(5));

        Ok(())
    }

    #[tokio::test]
    async fn place_order_applies_coupons() -> TestResult {
        let shop = Storefront::seed().await;
        shop.carts_service()
            .add_item(shop.user, shop.new_item(2))
            .await?;

        let mut request = cod(&shop);
        request.coupon_code = Some("SAVE10".to_string());

        let placed = shop.checkout_service().place_order(shop.user, request).await?;

        assert_eq!(placed.order.pricing.discount, 320);
        assert_eq!(placed.total_amount, 3200 + 576 - 320);

        Ok(())
    }

    #[tokio::test]
    async fn place_order_rejects_unknown_coupons() -> TestResult {
        let shop = Storefront::seed().await;
        shop.carts_service()
            .add_item(shop.user, shop.new_item(1))
            .await?;

        let mut request = cod(&shop);
        request.coupon_code = Some("NOPE".to_string());

        let result = shop.checkout_service().place_order(shop.user, request).await;

        assert!(
            matches!(result, Err(CheckoutError::Coupon(CouponError::NotFound))),
            "expected coupon NotFound, got {result:?}"
        );
        assert_eq!(shop.store.stock(shop.inventory).await, Some(5));

        Ok(())
    }

    #[tokio::test]
    async fn lost_stock_race_restores_earlier_lines() -> TestResult {
        let shop = Storefront::seed().await;
        let second = shop.add_second_size(4).await;

        let carts = shop.carts_service();
        carts.add_item(shop.user, shop.new_item(2)).await?;
        carts.add_item(shop.user, second).await?;

        let first_inventory = shop.inventory;
        let second_inventory = second.inventory_uuid;
        let mut inventory = MockInventoryRepository::new();
        inventory
            .expect_decrement()
            .once()
            .withf(move |uuid, quantity| *uuid == first_inventory && *quantity == 2)
            .return_once(|_, _| Ok(StockUpdate::Reserved { remaining: 3 }));
        inventory
            .expect_decrement()
            .once()
            .withf(move |uuid, _| *uuid == second_inventory)
            .return_once(|_, _| Ok(StockUpdate::Insufficient { available: 0 }));
        inventory
            .expect_increment()
            .once()
            .withf(move |uuid, quantity| *uuid == first_inventory && *quantity == 2)
            .return_once(|_, _| Ok(()));

        let mut stores = Stores::memory(&shop.store);
        stores.inventory = Arc::new(inventory);

        let result = StoreCheckoutService::new(stores, CheckoutPolicy::default())
            .place_order(shop.user, cod(&shop))
            .await;

        assert!(
            matches!(
                result,
                Err(CheckoutError::Line(LineProblem::InsufficientStock { available: 0, .. }))
            ),
            "expected InsufficientStock, got {result:?}"
        );
        assert_eq!(shop.store.order_count().await, 0);

        let cart = shop.store.find_cart(shop.user).await?.ok_or("cart missing")?;
        assert_eq!(cart.lines.len(), 2);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_checkouts_never_oversell() -> TestResult {
        const BUYERS: usize = 8;
        const STOCK: u32 = 3;

        let shop = Storefront::seed().await;
        shop.set_stock(STOCK).await;

        let mut buyers = Vec::with_capacity(BUYERS);

        for _ in 0..BUYERS {
            let (user, address) = shop.add_customer().await;
            shop.carts_service().add_item(user, shop.new_item(1)).await?;
            buyers.push((user, address));
        }

        let mut handles = Vec::with_capacity(BUYERS);

        for (user, address) in buyers {
            let service = shop.checkout_service();

            handles.push(tokio::spawn(async move {
                service
                    .place_order(
                        user,
                        PlaceOrder {
                            address_uuid: address,
                            payment_method: PaymentMethod::Cod,
                            coupon_code: None,
                        },
                    )
                    .await
            }));
        }

        let mut placed = 0;
        let mut conflicts = 0;

        for handle in handles {
            match handle.await? {
                Ok(_) => placed += 1,
                Err(error) if error.class() == ErrorClass::Conflict => conflicts += 1,
                Err(other) => return Err(format!("unexpected error: {other}").into()),
            }
        }

        assert_eq!(placed, STOCK as usize);
        assert_eq!(conflicts, BUYERS - STOCK as usize);
        assert_eq!(shop.store.stock(shop.inventory).await, Some(0));
        assert_eq!(shop.store.order_count().await, STOCK as usize);

        Ok(())
    }

    #[test]
    fn coupons_check_activity_expiry_and_minimum() {
        let now = Timestamp::now();
        let mut coupon = Coupon {
            code: "SAVE10".to_string(),
            percent: 10,
            max_discount: 500,
            min_purchase: 1000,
            expires_at: now,
            is_active: true,
        };

        assert_eq!(apply_coupon(&coupon, 2000, now), Err(CouponError::Expired));

        coupon.expires_at = Timestamp::MAX;

        assert_eq!(apply_coupon(&coupon, 2000, now), Ok(200));
        assert_eq!(apply_coupon(&coupon, 9000, now), Ok(500));
        assert_eq!(
            apply_coupon(&coupon, 999, now),
            Err(CouponError::MinimumNotMet { min_purchase: 1000 })
        );

        coupon.is_active = false;

        assert_eq!(apply_coupon(&coupon, 2000, now), Err(CouponError::Inactive));
    }
}
