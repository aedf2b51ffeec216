//! In-memory store
//!
//! Implements every repository trait over one lock-protected state. Used by
//! tests and by the `memory` storage mode.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use rustc_hash::FxHashMap;
use storefront::{
    carts::Cart,
    catalog::{
        CatalogSnapshot, Category, CategoryUuid, Inventory, InventoryUuid, Product, ProductUuid,
        Variant, VariantUuid,
    },
    customers::{Address, AddressUuid, User, UserUuid},
    orders::{Order, OrderNumber},
    pricing::Offer,
};
use tokio::sync::RwLock;

use super::{
    CartsRepository, CatalogKeys, CatalogRepository, Coupon, CouponsRepository,
    CustomersRepository, InventoryRepository, OrdersRepository, StockUpdate, StoreError,
};

#[derive(Debug, Default)]
struct State {
    users: FxHashMap<UserUuid, User>,
    addresses: FxHashMap<AddressUuid, Address>,
    categories: FxHashMap<CategoryUuid, Category>,
    products: FxHashMap<ProductUuid, Product>,
    variants: FxHashMap<VariantUuid, Variant>,
    inventories: FxHashMap<InventoryUuid, Inventory>,
    coupons: FxHashMap<String, Coupon>,
    carts: FxHashMap<UserUuid, Cart>,
    orders: FxHashMap<OrderNumber, Order>,
}

/// Thread-safe in-memory storefront state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.uuid, user);
    }

    pub async fn insert_address(&self, address: Address) {
        self.state
            .write()
            .await
            .addresses
            .insert(address.uuid, address);
    }

    pub async fn insert_category(&self, category: Category) {
        self.state
            .write()
            .await
            .categories
            .insert(category.uuid, category);
    }

    pub async fn insert_product(&self, product: Product) {
        self.state
            .write()
            .await
            .products
            .insert(product.uuid, product);
    }

    pub async fn insert_variant(&self, variant: Variant) {
        self.state
            .write()
            .await
            .variants
            .insert(variant.uuid, variant);
    }

    pub async fn insert_inventory(&self, inventory: Inventory) {
        self.state
            .write()
            .await
            .inventories
            .insert(inventory.uuid, inventory);
    }

    pub async fn insert_coupon(&self, coupon: Coupon) {
        self.state
            .write()
            .await
            .coupons
            .insert(coupon.code.clone(), coupon);
    }

    /// Apply `update` to a stored product.
    pub async fn update_product(&self, product: ProductUuid, update: impl FnOnce(&mut Product)) {
        if let Some(product) = self.state.write().await.products.get_mut(&product) {
            update(product);
        }
    }

    /// Apply `update` to a stored category.
    pub async fn update_category(&self, category: CategoryUuid, update: impl FnOnce(&mut Category)) {
        if let Some(category) = self.state.write().await.categories.get_mut(&category) {
            update(category);
        }
    }

    /// Apply `update` to a stored inventory row.
    pub async fn update_inventory(
        &self,
        inventory: InventoryUuid,
        update: impl FnOnce(&mut Inventory),
    ) {
        if let Some(inventory) = self.state.write().await.inventories.get_mut(&inventory) {
            update(inventory);
        }
    }

    /// Current stock of an inventory row.
    pub async fn stock(&self, inventory: InventoryUuid) -> Option<u32> {
        self.state
            .read()
            .await
            .inventories
            .get(&inventory)
            .map(|i| i.stock)
    }

    pub async fn product(&self, product: ProductUuid) -> Option<Product> {
        self.state.read().await.products.get(&product).cloned()
    }

    pub async fn category(&self, category: CategoryUuid) -> Option<Category> {
        self.state.read().await.categories.get(&category).cloned()
    }

    /// Number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

#[async_trait]
impl CartsRepository for MemoryStore {
    async fn find_cart(&self, user: UserUuid) -> Result<Option<Cart>, StoreError> {
        Ok(self.state.read().await.carts.get(&user).cloned())
    }

    async fn save_cart(&self, cart: &Cart) -> Result<Cart, StoreError> {
        let mut state = self.state.write().await;

        let current = state.carts.get(&cart.user_uuid).map(|c| c.version);

        match current {
            None if cart.version != 0 => return Err(StoreError::NotFound),
            Some(_) if cart.version == 0 => return Err(StoreError::AlreadyExists),
            Some(version) if version != cart.version => return Err(StoreError::StaleWrite),
            _ => {}
        }

        let mut saved = cart.clone();
        saved.version = cart.version + 1;
        state.carts.insert(saved.user_uuid, saved.clone());

        Ok(saved)
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn load_snapshot(&self, keys: &CatalogKeys) -> Result<CatalogSnapshot, StoreError> {
        let state = self.state.read().await;
        let mut snapshot = CatalogSnapshot::new();

        for uuid in &keys.products {
            if let Some(product) = state.products.get(uuid) {
                if let Some(category) = state.categories.get(&product.category_uuid) {
                    snapshot.insert_category(category.clone());
                }

                snapshot.insert_product(product.clone());
            }
        }

        for uuid in &keys.variants {
            if let Some(variant) = state.variants.get(uuid) {
                snapshot.insert_variant(variant.clone());
            }
        }

        for uuid in &keys.inventories {
            if let Some(inventory) = state.inventories.get(uuid) {
                snapshot.insert_inventory(inventory.clone());
            }
        }

        Ok(snapshot)
    }

    async fn expire_offers(&self, now: Timestamp) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let mut changed = 0;

        for product in state.products.values_mut() {
            if product.offer.is_expired(now) {
                product.offer = Offer::none();
                changed += 1;
            }
        }

        for category in state.categories.values_mut() {
            if category.offer.is_expired(now) {
                category.offer = Offer::none();
                changed += 1;
            }
        }

        Ok(changed)
    }
}

#[async_trait]
impl InventoryRepository for MemoryStore {
    async fn decrement(
        &self,
        inventory: InventoryUuid,
        quantity: u32,
    ) -> Result<StockUpdate, StoreError> {
        let mut state = self.state.write().await;
        let row = state
            .inventories
            .get_mut(&inventory)
            .ok_or(StoreError::NotFound)?;

        if row.stock < quantity {
            return Ok(StockUpdate::Insufficient {
                available: row.stock,
            });
        }

        row.stock -= quantity;

        Ok(StockUpdate::Reserved {
            remaining: row.stock,
        })
    }

    async fn increment(&self, inventory: InventoryUuid, quantity: u32) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let row = state
            .inventories
            .get_mut(&inventory)
            .ok_or(StoreError::NotFound)?;

        row.stock = row.stock.saturating_add(quantity);

        Ok(())
    }
}

#[async_trait]
impl OrdersRepository for MemoryStore {
    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        if state.orders.contains_key(&order.number) {
            return Err(StoreError::AlreadyExists);
        }

        state.orders.insert(order.number.clone(), order.clone());

        Ok(())
    }

    async fn find_order(&self, number: &OrderNumber) -> Result<Option<Order>, StoreError> {
        Ok(self.state.read().await.orders.get(number).cloned())
    }

    async fn list_orders(&self, user: UserUuid) -> Result<Vec<Order>, StoreError> {
        let state = self.state.read().await;

        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| order.user_uuid == user)
            .cloned()
            .collect();

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.uuid.cmp(&a.uuid)));

        Ok(orders)
    }

    async fn save_order(&self, order: &Order, read_at: Timestamp) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let stored = state
            .orders
            .get_mut(&order.number)
            .ok_or(StoreError::NotFound)?;

        if stored.updated_at != read_at {
            return Err(StoreError::StaleWrite);
        }

        *stored = order.clone();

        Ok(())
    }
}

#[async_trait]
impl CustomersRepository for MemoryStore {
    async fn find_user(&self, user: UserUuid) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&user).cloned())
    }

    async fn find_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<Option<Address>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .addresses
            .get(&address)
            .filter(|a| a.user_uuid == user)
            .cloned())
    }
}

#[async_trait]
impl CouponsRepository for MemoryStore {
    async fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
        Ok(self.state.read().await.coupons.get(code).cloned())
    }
}
