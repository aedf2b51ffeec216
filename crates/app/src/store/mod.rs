//! Persistence
//!
//! Repository traits used by the services, with a PostgreSQL implementation
//! and an in-memory one. Every method is atomic on its own.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use storefront::{
    carts::Cart,
    catalog::{CatalogSnapshot, InventoryUuid, ProductUuid, VariantUuid},
    customers::{Address, AddressUuid, User, UserUuid},
    orders::{Order, OrderNumber},
};

pub mod demo;
pub mod errors;
pub mod memory;
pub mod postgres;

pub use errors::StoreError;
pub use memory::MemoryStore;

use crate::database::Db;

/// Ids of the catalog records a cart (or a single addition) refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogKeys {
    pub products: Vec<ProductUuid>,
    pub variants: Vec<VariantUuid>,
    pub inventories: Vec<InventoryUuid>,
}

impl CatalogKeys {
    pub fn for_cart(cart: &Cart) -> Self {
        let mut keys = Self::default();

        for line in &cart.lines {
            keys.push(line.product_uuid, line.variant_uuid, line.inventory_uuid);
        }

        keys
    }

    pub fn for_line(product: ProductUuid, variant: VariantUuid, inventory: InventoryUuid) -> Self {
        let mut keys = Self::default();
        keys.push(product, variant, inventory);
        keys
    }

    fn push(&mut self, product: ProductUuid, variant: VariantUuid, inventory: InventoryUuid) {
        if !self.products.contains(&product) {
            self.products.push(product);
        }

        if !self.variants.contains(&variant) {
            self.variants.push(variant);
        }

        if !self.inventories.contains(&inventory) {
            self.inventories.push(inventory);
        }
    }
}

/// Result of an atomic conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockUpdate {
    /// Stock was taken; `remaining` is left on the row.
    Reserved { remaining: u32 },

    /// Stock was insufficient at the moment of the write; nothing changed.
    Insufficient { available: u32 },
}

/// A percentage coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    pub code: String,
    pub percent: u8,
    pub max_discount: u64,
    pub min_purchase: u64,
    pub expires_at: Timestamp,
    pub is_active: bool,
}

#[automock]
#[async_trait]
pub trait CartsRepository: Send + Sync {
    /// The user's cart, if one was ever created.
    async fn find_cart(&self, user: UserUuid) -> Result<Option<Cart>, StoreError>;

    /// Persist `cart`, conditional on its `version` still being current.
    ///
    /// A cart with version 0 is inserted. Returns the stored cart with the
    /// bumped version, or [`StoreError::StaleWrite`] when another writer got
    /// there first.
    async fn save_cart(&self, cart: &Cart) -> Result<Cart, StoreError>;
}

#[automock]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Load the referenced products, their categories, variants and inventories.
    /// Missing records are simply absent from the snapshot.
    async fn load_snapshot(&self, keys: &CatalogKeys) -> Result<CatalogSnapshot, StoreError>;

    /// Zero every product and category offer expired at `now`, returning the
    /// number of rows changed.
    async fn expire_offers(&self, now: Timestamp) -> Result<u64, StoreError>;
}

#[automock]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Take `quantity` from the row only if at least that much is in stock.
    async fn decrement(
        &self,
        inventory: InventoryUuid,
        quantity: u32,
    ) -> Result<StockUpdate, StoreError>;

    /// Put `quantity` back.
    async fn increment(&self, inventory: InventoryUuid, quantity: u32) -> Result<(), StoreError>;
}

#[automock]
#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Insert a new order. A taken order number is [`StoreError::AlreadyExists`].
    async fn insert_order(&self, order: &Order) -> Result<(), StoreError>;

    async fn find_order(&self, number: &OrderNumber) -> Result<Option<Order>, StoreError>;

    /// The user's orders, newest first.
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<Order>, StoreError>;

    /// Write status changes, conditional on the order not having been updated
    /// since `read_at`.
    async fn save_order(&self, order: &Order, read_at: Timestamp) -> Result<(), StoreError>;
}

#[automock]
#[async_trait]
pub trait CustomersRepository: Send + Sync {
    async fn find_user(&self, user: UserUuid) -> Result<Option<User>, StoreError>;

    /// An address by id; addresses of other users are not returned.
    async fn find_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<Option<Address>, StoreError>;
}

#[automock]
#[async_trait]
pub trait CouponsRepository: Send + Sync {
    async fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, StoreError>;
}

/// The full set of repositories a service may need.
#[derive(Clone)]
pub struct Stores {
    pub carts: Arc<dyn CartsRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub inventory: Arc<dyn InventoryRepository>,
    pub orders: Arc<dyn OrdersRepository>,
    pub customers: Arc<dyn CustomersRepository>,
    pub coupons: Arc<dyn CouponsRepository>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

impl Stores {
    /// Repositories backed by PostgreSQL.
    pub fn postgres(db: &Db) -> Self {
        Self {
            carts: Arc::new(postgres::PgCartsRepository::new(db.clone())),
            catalog: Arc::new(postgres::PgCatalogRepository::new(db.clone())),
            inventory: Arc::new(postgres::PgInventoryRepository::new(db.clone())),
            orders: Arc::new(postgres::PgOrdersRepository::new(db.clone())),
            customers: Arc::new(postgres::PgCustomersRepository::new(db.clone())),
            coupons: Arc::new(postgres::PgCouponsRepository::new(db.clone())),
        }
    }

    /// Repositories backed by one shared in-memory store.
    pub fn memory(store: &MemoryStore) -> Self {
        Self {
            carts: Arc::new(store.clone()),
            catalog: Arc::new(store.clone()),
            inventory: Arc::new(store.clone()),
            orders: Arc::new(store.clone()),
            customers: Arc::new(store.clone()),
            coupons: Arc::new(store.clone()),
        }
    }
}
