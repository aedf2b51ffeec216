//! Orders service.

use std::iter;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use storefront::{
    customers::UserUuid,
    orders::{
        Actor, LifecycleError, Order, OrderItemUuid, OrderNumber, OrderStatus, Restocks,
        ReturnPolicy, ReturnRequest,
    },
};
use tracing::{error, info};

use crate::{domain::orders::errors::OrdersServiceError, store::Stores};

#[derive(Debug, Clone)]
pub struct StoreOrdersService {
    stores: Stores,
    returns: ReturnPolicy,
}

impl StoreOrdersService {
    #[must_use]
    pub fn new(stores: Stores, returns: ReturnPolicy) -> Self {
        Self { stores, returns }
    }

    /// Load an order, hiding orders of other users when `owner` is given.
    async fn load(
        &self,
        number: &OrderNumber,
        owner: Option<UserUuid>,
    ) -> Result<Order, OrdersServiceError> {
        self.stores
            .orders
            .find_order(number)
            .await?
            .filter(|order| owner.is_none_or(|owner| order.user_uuid == owner))
            .ok_or(OrdersServiceError::NotFound)
    }

    /// Apply `change` to a freshly read order, save it conditionally on nobody
    /// having written it since, then put back any released stock.
    async fn apply<F>(
        &self,
        number: &OrderNumber,
        owner: Option<UserUuid>,
        change: F,
    ) -> Result<Order, OrdersServiceError>
    where
        F: FnOnce(&mut Order, Timestamp) -> Result<Restocks, LifecycleError> + Send,
    {
        let mut order = self.load(number, owner).await?;
        let read_at = order.updated_at;

        let restocks = change(&mut order, Timestamp::now())?;

        self.stores.orders.save_order(&order, read_at).await?;

        for restock in restocks {
            if let Err(source) = self
                .stores
                .inventory
                .increment(restock.inventory, restock.quantity)
                .await
            {
                error!(
                    order = %order.number,
                    inventory = %restock.inventory,
                    quantity = restock.quantity,
                    error = %source,
                    "failed to restock inventory"
                );
            }
        }

        Ok(order)
    }
}

#[async_trait]
impl OrdersService for StoreOrdersService {
    async fn get_order(
        &self,
        user: UserUuid,
        number: &OrderNumber,
    ) -> Result<Order, OrdersServiceError> {
        self.load(number, Some(user)).await
    }

    async fn list_orders(&self, user: UserUuid) -> Result<Vec<Order>, OrdersServiceError> {
        Ok(self.stores.orders.list_orders(user).await?)
    }

    async fn cancel_item(
        &self,
        user: UserUuid,
        number: &OrderNumber,
        item: OrderItemUuid,
        reason: Option<String>,
    ) -> Result<Order, OrdersServiceError> {
        let order = self
            .apply(number, Some(user), |order, now| {
                let restock = order.cancel_item(item, reason.as_deref(), Actor::User, now)?;

                Ok(iter::once(restock).collect())
            })
            .await?;

        info!(order = %order.number, item = %item, status = %order.status, "order item cancelled");

        Ok(order)
    }

    async fn cancel_order(
        &self,
        user: UserUuid,
        number: &OrderNumber,
        reason: Option<String>,
    ) -> Result<Order, OrdersServiceError> {
        let order = self
            .apply(number, Some(user), |order, now| {
                order.cancel_order(reason.as_deref(), Actor::User, now)
            })
            .await?;

        info!(order = %order.number, "order cancelled");

        Ok(order)
    }

    async fn request_return(
        &self,
        user: UserUuid,
        number: &OrderNumber,
        item: OrderItemUuid,
        request: ReturnRequest,
    ) -> Result<Order, OrdersServiceError> {
        let policy = self.returns;

        let order = self
            .apply(number, Some(user), |order, now| {
                order.request_return(item, &request, &policy, now)?;

                Ok(Restocks::new())
            })
            .await?;

        info!(order = %order.number, item = %item, reason = %request.reason, "return requested");

        Ok(order)
    }

    async fn request_order_return(
        &self,
        user: UserUuid,
        number: &OrderNumber,
        request: ReturnRequest,
    ) -> Result<Order, OrdersServiceError> {
        let policy = self.returns;
        let mut requested = 0;

        let order = self
            .apply(number, Some(user), |order, now| {
                requested = order.request_order_return(&request, &policy, now)?;

                Ok(Restocks::new())
            })
            .await?;

        info!(order = %order.number, items = requested, "return requested for order");

        Ok(order)
    }

    async fn get_order_admin(&self, number: &OrderNumber) -> Result<Order, OrdersServiceError> {
        self.load(number, None).await
    }

    async fn update_status(
        &self,
        number: &OrderNumber,
        status: OrderStatus,
    ) -> Result<Order, OrdersServiceError> {
        let order = self
            .apply(number, None, |order, now| order.update_status(status, now))
            .await?;

        info!(
            order = %order.number,
            status = %order.status,
            payment = %order.payment.status,
            "order status updated"
        );

        Ok(order)
    }

    async fn approve_return(
        &self,
        number: &OrderNumber,
        item: OrderItemUuid,
    ) -> Result<Order, OrdersServiceError> {
        let order = self
            .apply(number, None, |order, now| {
                let restock = order.approve_return(item, now)?;

                Ok(iter::once(restock).collect())
            })
            .await?;

        info!(order = %order.number, item = %item, "return approved");

        Ok(order)
    }

    async fn reject_return(
        &self,
        number: &OrderNumber,
        item: OrderItemUuid,
        reason: String,
    ) -> Result<Order, OrdersServiceError> {
        let order = self
            .apply(number, None, |order, now| {
                order.reject_return(item, &reason, now)?;

                Ok(Restocks::new())
            })
            .await?;

        info!(order = %order.number, item = %item, "return rejected");

        Ok(order)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// One of the user's orders. Orders of other users are not found.
    async fn get_order(
        &self,
        user: UserUuid,
        number: &OrderNumber,
    ) -> Result<Order, OrdersServiceError>;

    /// The user's orders, newest first.
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<Order>, OrdersServiceError>;

    /// Cancel one `PENDING` item and restock it.
    async fn cancel_item(
        &self,
        user: UserUuid,
        number: &OrderNumber,
        item: OrderItemUuid,
        reason: Option<String>,
    ) -> Result<Order, OrdersServiceError>;

    /// Cancel every `PENDING` item of the order.
    async fn cancel_order(
        &self,
        user: UserUuid,
        number: &OrderNumber,
        reason: Option<String>,
    ) -> Result<Order, OrdersServiceError>;

    async fn request_return(
        &self,
        user: UserUuid,
        number: &OrderNumber,
        item: OrderItemUuid,
        request: ReturnRequest,
    ) -> Result<Order, OrdersServiceError>;

    /// Request a return for every eligible item.
    async fn request_order_return(
        &self,
        user: UserUuid,
        number: &OrderNumber,
        request: ReturnRequest,
    ) -> Result<Order, OrdersServiceError>;

    async fn get_order_admin(&self, number: &OrderNumber) -> Result<Order, OrdersServiceError>;

    /// Move the order, and every item still in step with it, to `status`.
    async fn update_status(
        &self,
        number: &OrderNumber,
        status: OrderStatus,
    ) -> Result<Order, OrdersServiceError>;

    async fn approve_return(
        &self,
        number: &OrderNumber,
        item: OrderItemUuid,
    ) -> Result<Order, OrdersServiceError>;

    async fn reject_return(
        &self,
        number: &OrderNumber,
        item: OrderItemUuid,
        reason: String,
    ) -> Result<Order, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use storefront::orders::{ItemStatus, PaymentStatus, ReturnReason};
    use testresult::TestResult;

    use crate::{
        domain::carts::CartsService,
        store::{MockOrdersRepository, StoreError},
        test::fixtures::Storefront,
    };

    use super::*;

    fn changed_mind() -> ReturnRequest {
        ReturnRequest {
            reason: ReturnReason::ChangedMind,
            comment: None,
            photos: Vec::new(),
        }
    }

    #[tokio::test]
    async fn cancelling_every_item_cancels_the_order_and_restocks() -> TestResult {
        let shop = Storefront::seed().await;
        let second = shop.add_second_size(4).await;

        let carts = shop.carts_service();
        carts.add_item(shop.user, shop.new_item(2)).await?;
        carts.add_item(shop.user, second).await?;

        let placed = shop.place_cod_order().await?;
        assert_eq!(shop.store.stock(shop.inventory).await, Some(3));
        assert_eq!(shop.store.stock(second.inventory_uuid).await, Some(3));

        let service = shop.orders_service();
        let mut order = placed.order;

        for item in order.items.iter().map(|item| item.uuid).collect::<Vec<_>>() {
            order = service
                .cancel_item(shop.user, &placed.order_id, item, None)
                .await?;
        }

        assert_eq!(order.status, OrderStatus::Cancelled);
        assert!(order.cancelled_at.is_some());
        assert_eq!(shop.store.stock(shop.inventory).await, Some(5));
        assert_eq!(shop.store.stock(second.inventory_uuid).await, Some(4));

        Ok(())
    }

    #[tokio::test]
    async fn users_cannot_see_other_users_orders() -> TestResult {
        let shop = Storefront::seed().await;
        shop.carts_service()
            .add_item(shop.user, shop.new_item(1))
            .await?;
        let placed = shop.place_cod_order().await?;

        let result = shop
            .orders_service()
            .get_order(UserUuid::new(), &placed.order_id)
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn fulfillment_marks_cod_paid_and_allows_returns() -> TestResult {
        let shop = Storefront::seed().await;
        shop.carts_service()
            .add_item(shop.user, shop.new_item(2))
            .await?;
        let placed = shop.place_cod_order().await?;
        let number = &placed.order_id;

        let service = shop.orders_service();

        for status in [
            OrderStatus::Shipped,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ] {
            service.update_status(number, status).await?;
        }

        let order = service.get_order_admin(number).await?;
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.payment.status, PaymentStatus::Paid);

        let item = order.items.first().ok_or("order has no items")?.uuid;

        let order = service
            .request_return(shop.user, number, item, changed_mind())
            .await?;
        assert_eq!(
            order.item(item).map(|item| item.status),
            Some(ItemStatus::ReturnRequested)
        );

        let order = service.approve_return(number, item).await?;
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.payment.status, PaymentStatus::Refunded);
        assert_eq!(order.payment.refunded_amount, order.pricing.subtotal);
        assert_eq!(shop.store.stock(shop.inventory).await, Some(5));

        Ok(())
    }

    #[tokio::test]
    async fn invalid_transitions_name_both_states() -> TestResult {
        let shop = Storefront::seed().await;
        shop.carts_service()
            .add_item(shop.user, shop.new_item(1))
            .await?;
        let placed = shop.place_cod_order().await?;

        let result = shop
            .orders_service()
            .update_status(&placed.order_id, OrderStatus::Delivered)
            .await;

        let Err(error) = result else {
            panic!("expected an invalid transition, got {result:?}");
        };

        assert_eq!(
            error.to_string(),
            "cannot change status from PENDING to DELIVERED"
        );

        Ok(())
    }

    #[tokio::test]
    async fn rejected_returns_cannot_be_requested_again() -> TestResult {
        let shop = Storefront::seed().await;
        shop.carts_service()
            .add_item(shop.user, shop.new_item(1))
            .await?;
        let placed = shop.place_cod_order().await?;
        let number = &placed.order_id;

        let service = shop.orders_service();

        for status in [
            OrderStatus::Shipped,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ] {
            service.update_status(number, status).await?;
        }

        let order = service
            .request_order_return(shop.user, number, changed_mind())
            .await?;
        let item = order.items.first().ok_or("order has no items")?.uuid;

        service
            .reject_return(number, item, "Worn".to_string())
            .await?;

        let result = service
            .request_return(shop.user, number, item, changed_mind())
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::Lifecycle(
                    LifecycleError::ReturnPreviouslyRejected
                ))
            ),
            "expected ReturnPreviouslyRejected, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn stale_order_writes_are_conflicts_and_do_not_restock() -> TestResult {
        let shop = Storefront::seed().await;
        shop.carts_service()
            .add_item(shop.user, shop.new_item(2))
            .await?;
        let placed = shop.place_cod_order().await?;

        let stored = placed.order.clone();
        let mut orders = MockOrdersRepository::new();
        orders
            .expect_find_order()
            .once()
            .return_once(move |_| Ok(Some(stored)));
        orders
            .expect_save_order()
            .once()
            .return_once(|_, _| Err(StoreError::StaleWrite));

        let mut stores = Stores::memory(&shop.store);
        stores.orders = Arc::new(orders);

        let result = StoreOrdersService::new(stores, ReturnPolicy::default())
            .cancel_order(shop.user, &placed.order_id, None)
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::ConcurrentUpdate)),
            "expected ConcurrentUpdate, got {result:?}"
        );
        assert_eq!(shop.store.stock(shop.inventory).await, Some(3));

        Ok(())
    }
}
