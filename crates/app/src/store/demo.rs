//! Demo catalog for the in-memory storage mode.

use jiff::{SignedDuration, Timestamp};
use storefront::{
    catalog::{
        Category, CategoryUuid, Inventory, InventoryUuid, Product, ProductUuid, Variant,
        VariantUuid,
    },
    customers::{Address, AddressUuid, User, UserUuid},
    pricing::{Offer, PricingError},
};
use thiserror::Error;
use uuid::Uuid;

use super::{Coupon, MemoryStore};

pub const DEMO_USER: UserUuid =
    UserUuid::from_uuid(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0001));

pub const DEMO_ADDRESS: AddressUuid =
    AddressUuid::from_uuid(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0002));

pub const DEMO_CATEGORY: CategoryUuid =
    CategoryUuid::from_uuid(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0003));

pub const DEMO_PRODUCT: ProductUuid =
    ProductUuid::from_uuid(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0004));

pub const DEMO_VARIANT: VariantUuid =
    VariantUuid::from_uuid(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0005));

pub const DEMO_INVENTORY: InventoryUuid =
    InventoryUuid::from_uuid(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0006));

/// Code of the demo coupon: 10% off, at most ₹500, on orders from ₹1000.
pub const DEMO_COUPON: &str = "SAVE10";

#[derive(Debug, Error)]
pub enum DemoSeedError {
    #[error("demo offer expiry is out of range")]
    Time(#[from] jiff::Error),

    #[error(transparent)]
    Offer(#[from] PricingError),
}

/// The demo records, ready to be stored.
#[derive(Debug, Clone)]
pub struct DemoData {
    pub user: User,
    pub address: Address,
    pub category: Category,
    pub product: Product,
    pub variant: Variant,
    pub inventory: Inventory,
    pub coupon: Coupon,
}

impl DemoData {
    /// One customer and one purchasable shoe: ₹2000 with a 20% offer that
    /// expires a day after `now`, five pairs in stock.
    ///
    /// # Errors
    ///
    /// Returns an error when the offer expiry cannot be represented.
    pub fn new(now: Timestamp) -> Result<Self, DemoSeedError> {
        let tomorrow = now.checked_add(SignedDuration::from_hours(24))?;

        Ok(Self {
            user: User {
                uuid: DEMO_USER,
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
            },
            address: Address {
                uuid: DEMO_ADDRESS,
                user_uuid: DEMO_USER,
                full_name: "Asha Menon".to_string(),
                phone: "9800000000".to_string(),
                street_address: "12 Marine Drive".to_string(),
                city: "Kochi".to_string(),
                state: "Kerala".to_string(),
                pincode: "682031".to_string(),
                country: "India".to_string(),
                is_deleted: false,
            },
            category: Category {
                uuid: DEMO_CATEGORY,
                name: "Sneakers".to_string(),
                offer: Offer::none(),
                is_listed: true,
                is_deleted: false,
            },
            product: Product {
                uuid: DEMO_PRODUCT,
                category_uuid: DEMO_CATEGORY,
                name: "Runner".to_string(),
                base_price: 2000,
                offer: Offer::new(20, Some(tomorrow))?,
                is_listed: true,
            },
            variant: Variant {
                uuid: DEMO_VARIANT,
                product_uuid: DEMO_PRODUCT,
                color: "Black".to_string(),
                images: vec!["runner-black.jpg".to_string()],
                is_active: true,
            },
            inventory: Inventory {
                uuid: DEMO_INVENTORY,
                variant_uuid: DEMO_VARIANT,
                size: "9".to_string(),
                sku: "RUN-BLK-9".to_string(),
                stock: 5,
                is_active: true,
            },
            coupon: Coupon {
                code: DEMO_COUPON.to_string(),
                percent: 10,
                max_discount: 500,
                min_purchase: 1000,
                expires_at: tomorrow,
                is_active: true,
            },
        })
    }
}

/// Store [`DemoData`] for `now` in `store`.
///
/// # Errors
///
/// Returns an error when the offer expiry cannot be represented.
pub async fn seed(store: &MemoryStore, now: Timestamp) -> Result<(), DemoSeedError> {
    let data = DemoData::new(now)?;

    store.insert_user(data.user).await;
    store.insert_address(data.address).await;
    store.insert_category(data.category).await;
    store.insert_product(data.product).await;
    store.insert_variant(data.variant).await;
    store.insert_inventory(data.inventory).await;
    store.insert_coupon(data.coupon).await;

    Ok(())
}
