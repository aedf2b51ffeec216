//! Carts service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use storefront::{
    carts::{Cart, CartError, CartLimits, LineAddition, QuantityAction},
    catalog::{InventoryUuid, ProductUuid, VariantUuid},
    customers::UserUuid,
    reconcile::Reconciliation,
};
use tracing::info;

use crate::{
    domain::carts::{errors::CartsServiceError, reconciler::reconcile_stored},
    store::{CatalogKeys, Stores},
};

/// A request to put an item in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewCartItem {
    pub product_uuid: ProductUuid,
    pub variant_uuid: VariantUuid,
    pub inventory_uuid: InventoryUuid,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct StoreCartsService {
    stores: Stores,
    limits: CartLimits,
}

impl StoreCartsService {
    #[must_use]
    pub fn new(stores: Stores, limits: CartLimits) -> Self {
        Self { stores, limits }
    }

    async fn existing_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError> {
        self.stores
            .carts
            .find_cart(user)
            .await?
            .ok_or(CartsServiceError::Cart(CartError::LineNotFound))
    }
}

#[async_trait]
impl CartsService for StoreCartsService {
    async fn view_cart(&self, user: UserUuid) -> Result<Option<Reconciliation>, CartsServiceError> {
        let reconciled = reconcile_stored(&self.stores, user, Timestamp::now()).await?;

        Ok(reconciled.map(|reconciled| reconciled.reconciliation))
    }

    async fn add_item(&self, user: UserUuid, item: NewCartItem) -> Result<Cart, CartsServiceError> {
        let now = Timestamp::now();

        let catalog = self
            .stores
            .catalog
            .load_snapshot(&CatalogKeys::for_line(
                item.product_uuid,
                item.variant_uuid,
                item.inventory_uuid,
            ))
            .await?;

        let resolved = catalog.resolve(item.product_uuid, item.variant_uuid, item.inventory_uuid)?;

        let mut cart = self
            .stores
            .carts
            .find_cart(user)
            .await?
            .unwrap_or_else(|| Cart::new(user, now));

        cart.add(
            LineAddition {
                product_uuid: item.product_uuid,
                variant_uuid: item.variant_uuid,
                inventory_uuid: item.inventory_uuid,
                quantity: item.quantity,
                price: resolved.price(now),
                offer_percent: resolved.offer_percent(now),
            },
            resolved.inventory.stock,
            &self.limits,
        )?;

        cart.touch(now);

        let saved = self.stores.carts.save_cart(&cart).await?;

        info!(
            user = %user,
            inventory = %item.inventory_uuid,
            quantity = item.quantity,
            "item added to cart"
        );

        Ok(saved)
    }

    async fn update_quantity(
        &self,
        user: UserUuid,
        inventory: InventoryUuid,
        action: QuantityAction,
    ) -> Result<Cart, CartsServiceError> {
        let now = Timestamp::now();
        let mut cart = self.existing_cart(user).await?;

        let line = cart.line(inventory).ok_or(CartError::LineNotFound)?;
        let (product, variant) = (line.product_uuid, line.variant_uuid);

        let catalog = self
            .stores
            .catalog
            .load_snapshot(&CatalogKeys::for_line(product, variant, inventory))
            .await?;

        let available = catalog.resolve(product, variant, inventory)?.inventory.stock;

        cart.adjust(inventory, action, available, &self.limits)?;
        cart.touch(now);

        Ok(self.stores.carts.save_cart(&cart).await?)
    }

    async fn remove_item(
        &self,
        user: UserUuid,
        inventory: InventoryUuid,
    ) -> Result<Cart, CartsServiceError> {
        let mut cart = self.existing_cart(user).await?;

        cart.remove(inventory)?;
        cart.touch(Timestamp::now());

        Ok(self.stores.carts.save_cart(&cart).await?)
    }

    async fn clear_cart(&self, user: UserUuid) -> Result<(), CartsServiceError> {
        let Some(mut cart) = self.stores.carts.find_cart(user).await? else {
            return Ok(());
        };

        if cart.is_empty() {
            return Ok(());
        }

        cart.clear();
        cart.touch(Timestamp::now());

        self.stores.carts.save_cart(&cart).await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// The user's cart reconciled against the live catalog, or `None` when the
    /// user never had one. The cart is written back only when it changed.
    async fn view_cart(&self, user: UserUuid) -> Result<Option<Reconciliation>, CartsServiceError>;

    /// Add an item, creating the cart on first use and merging into an
    /// existing line for the same inventory.
    async fn add_item(&self, user: UserUuid, item: NewCartItem) -> Result<Cart, CartsServiceError>;

    /// Step a line's quantity up or down by one.
    async fn update_quantity(
        &self,
        user: UserUuid,
        inventory: InventoryUuid,
        action: QuantityAction,
    ) -> Result<Cart, CartsServiceError>;

    async fn remove_item(
        &self,
        user: UserUuid,
        inventory: InventoryUuid,
    ) -> Result<Cart, CartsServiceError>;

    /// Empty the cart, keeping the cart itself.
    async fn clear_cart(&self, user: UserUuid) -> Result<(), CartsServiceError>;
}
