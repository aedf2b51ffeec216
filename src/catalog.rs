//! Catalog
//!
//! Live catalog state as seen by the cart and checkout rules. A
//! [`CatalogSnapshot`] holds the records referenced by one cart, loaded in a
//! single read so every line is judged against the same view.

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    pricing::{self, Offer},
    uuids::TypedUuid,
};

/// Category UUID
pub type CategoryUuid = TypedUuid<Category>;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Variant UUID
pub type VariantUuid = TypedUuid<Variant>;

/// Inventory UUID
pub type InventoryUuid = TypedUuid<Inventory>;

/// Category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category UUID
    pub uuid: CategoryUuid,

    /// Display name
    pub name: String,

    /// Offer applied to every product in the category
    pub offer: Offer,

    /// Shown in the storefront
    pub is_listed: bool,

    /// Soft-deleted
    pub is_deleted: bool,
}

impl Category {
    /// Listed and not soft-deleted.
    pub fn is_available(&self) -> bool {
        self.is_listed && !self.is_deleted
    }
}

/// Product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product UUID
    pub uuid: ProductUuid,

    /// Owning category
    pub category_uuid: CategoryUuid,

    /// Display name
    pub name: String,

    /// Price before any offer, in whole rupees
    pub base_price: u64,

    /// Product-level offer
    pub offer: Offer,

    /// Shown in the storefront
    pub is_listed: bool,
}

/// A color grouping under a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant UUID
    pub uuid: VariantUuid,

    /// Owning product
    pub product_uuid: ProductUuid,

    /// Color name
    pub color: String,

    /// Image URLs, primary first
    pub images: Vec<String>,

    /// Available for sale
    pub is_active: bool,
}

impl Variant {
    /// First image, used for order snapshots.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Stock for one (variant, size).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Inventory UUID
    pub uuid: InventoryUuid,

    /// Owning variant
    pub variant_uuid: VariantUuid,

    /// Size label
    pub size: String,

    /// Unique stock keeping unit
    pub sku: String,

    /// Units on hand
    pub stock: u32,

    /// Available for sale
    pub is_active: bool,
}

/// Why a referenced line cannot be sold.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum Unavailable {
    /// The product no longer exists.
    #[error("product not found")]
    ProductMissing,

    /// The product is delisted.
    #[error("this product is currently unavailable")]
    ProductUnlisted,

    /// The variant is inactive, missing or belongs to another product.
    #[error("selected color variant is not available")]
    VariantUnavailable,

    /// The size is inactive, missing or belongs to another variant.
    #[error("selected size is not available")]
    InventoryUnavailable,

    /// The category is delisted or deleted.
    #[error("this product category is currently unavailable")]
    CategoryUnavailable,
}

/// All catalog records a line points at, after every availability check passed.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedLine<'a> {
    /// Listed product
    pub product: &'a Product,

    /// Available category of the product
    pub category: &'a Category,

    /// Active variant of the product
    pub variant: &'a Variant,

    /// Active inventory of the variant
    pub inventory: &'a Inventory,
}

impl ResolvedLine<'_> {
    /// Sale price at `now`.
    pub fn price(&self, now: Timestamp) -> u64 {
        pricing::final_price(
            self.product.base_price,
            &self.product.offer,
            &self.category.offer,
            now,
        )
    }

    /// Effective discount percentage at `now`.
    pub fn offer_percent(&self, now: Timestamp) -> u8 {
        pricing::effective_percent(self.product.base_price, self.price(now))
    }
}

/// Catalog records keyed by id.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    categories: FxHashMap<CategoryUuid, Category>,
    products: FxHashMap<ProductUuid, Product>,
    variants: FxHashMap<VariantUuid, Variant>,
    inventories: FxHashMap<InventoryUuid, Inventory>,
}

impl CatalogSnapshot {
    /// Empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a category.
    pub fn insert_category(&mut self, category: Category) {
        self.categories.insert(category.uuid, category);
    }

    /// Add or replace a product.
    pub fn insert_product(&mut self, product: Product) {
        self.products.insert(product.uuid, product);
    }

    /// Add or replace a variant.
    pub fn insert_variant(&mut self, variant: Variant) {
        self.variants.insert(variant.uuid, variant);
    }

    /// Add or replace an inventory row.
    pub fn insert_inventory(&mut self, inventory: Inventory) {
        self.inventories.insert(inventory.uuid, inventory);
    }

    /// Look up a product.
    pub fn product(&self, uuid: ProductUuid) -> Option<&Product> {
        self.products.get(&uuid)
    }

    /// Look up a variant.
    pub fn variant(&self, uuid: VariantUuid) -> Option<&Variant> {
        self.variants.get(&uuid)
    }

    /// Look up an inventory row.
    pub fn inventory(&self, uuid: InventoryUuid) -> Option<&Inventory> {
        self.inventories.get(&uuid)
    }

    /// Look up a category.
    pub fn category(&self, uuid: CategoryUuid) -> Option<&Category> {
        self.categories.get(&uuid)
    }

    /// Resolve a (product, variant, inventory) triple.
    ///
    /// Product, variant and inventory are checked before the category.
    /// A variant that belongs to another product, or an inventory that belongs
    /// to another variant, is treated as unavailable. Stock is not checked.
    ///
    /// # Errors
    ///
    /// Returns the first [`Unavailable`] reason that applies.
    pub fn resolve(
        &self,
        product: ProductUuid,
        variant: VariantUuid,
        inventory: InventoryUuid,
    ) -> Result<ResolvedLine<'_>, Unavailable> {
        let product = self.product(product).ok_or(Unavailable::ProductMissing)?;

        if !product.is_listed {
            return Err(Unavailable::ProductUnlisted);
        }

        let variant = self
            .variant(variant)
            .filter(|v| v.is_active && v.product_uuid == product.uuid)
            .ok_or(Unavailable::VariantUnavailable)?;

        let inventory = self
            .inventory(inventory)
            .filter(|i| i.is_active && i.variant_uuid == variant.uuid)
            .ok_or(Unavailable::InventoryUnavailable)?;

        let category = self
            .category(product.category_uuid)
            .filter(|c| c.is_available())
            .ok_or(Unavailable::CategoryUnavailable)?;

        Ok(ResolvedLine {
            product,
            category,
            variant,
            inventory,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Catalog fixtures shared by the rule tests.

    use super::*;

    /// One product with a single variant and size.
    pub(crate) struct Shoe {
        pub(crate) snapshot: CatalogSnapshot,
        pub(crate) category: CategoryUuid,
        pub(crate) product: ProductUuid,
        pub(crate) variant: VariantUuid,
        pub(crate) inventory: InventoryUuid,
    }

    impl Shoe {
        pub(crate) fn new(base_price: u64, stock: u32) -> Self {
            let mut snapshot = CatalogSnapshot::new();
            let category = CategoryUuid::new();
            let product = ProductUuid::new();
            let variant = VariantUuid::new();
            let inventory = InventoryUuid::new();

            snapshot.insert_category(Category {
                uuid: category,
                name: "Sneakers".to_string(),
                offer: Offer::none(),
                is_listed: true,
                is_deleted: false,
            });

            snapshot.insert_product(Product {
                uuid: product,
                category_uuid: category,
                name: "Runner".to_string(),
                base_price,
                offer: Offer::none(),
                is_listed: true,
            });

            snapshot.insert_variant(Variant {
                uuid: variant,
                product_uuid: product,
                color: "Black".to_string(),
                images: vec!["runner-black.jpg".to_string()],
                is_active: true,
            });

            snapshot.insert_inventory(Inventory {
                uuid: inventory,
                variant_uuid: variant,
                size: "9".to_string(),
                sku: "RUN-BLK-9".to_string(),
                stock,
                is_active: true,
            });

            Self {
                snapshot,
                category,
                product,
                variant,
                inventory,
            }
        }

        pub(crate) fn resolve(&self) -> Result<ResolvedLine<'_>, Unavailable> {
            self.snapshot
                .resolve(self.product, self.variant, self.inventory)
        }

        pub(crate) fn product_mut(&mut self) -> Option<&mut Product> {
            self.snapshot.products.get_mut(&self.product)
        }

        pub(crate) fn category_mut(&mut self) -> Option<&mut Category> {
            self.snapshot.categories.get_mut(&self.category)
        }

        pub(crate) fn variant_mut(&mut self) -> Option<&mut Variant> {
            self.snapshot.variants.get_mut(&self.variant)
        }

        pub(crate) fn inventory_mut(&mut self) -> Option<&mut Inventory> {
            self.snapshot.inventories.get_mut(&self.inventory)
        }
    }
}
