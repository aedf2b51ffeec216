//! Carts

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::{InventoryUuid, ProductUuid, VariantUuid},
    customers::UserUuid,
    errors::{Classify, ErrorClass},
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

/// Cart Line UUID
pub type CartLineUuid = TypedUuid<CartLine>;

/// Default maximum quantity of a single line.
pub const DEFAULT_MAX_QUANTITY_PER_ITEM: u32 = 10;

/// Default maximum total quantity across a cart.
pub const DEFAULT_MAX_CART_QUANTITY: u32 = 50;

/// Errors raised by cart mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Requested quantity is zero or above the per-item limit.
    #[error("quantity must be between 1 and {max}")]
    InvalidQuantity {
        /// Per-item limit
        max: u32,
    },

    /// Merging into an existing line would pass the per-item limit.
    #[error("cannot add more than {max} items of the same product")]
    ItemLimit {
        /// Per-item limit
        max: u32,
    },

    /// The cart total would pass the per-cart limit.
    #[error("a cart can hold at most {max} items")]
    CartLimit {
        /// Per-cart limit
        max: u32,
    },

    /// Stock does not cover the new quantity.
    #[error("only {available} items available in stock")]
    InsufficientStock {
        /// Units on hand
        available: u32,
    },

    /// Decrement would drop the line below one.
    #[error("quantity cannot be less than 1")]
    BelowMinimum,

    /// No line holds the inventory.
    #[error("item not found in cart")]
    LineNotFound,
}

impl Classify for CartError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::LineNotFound => ErrorClass::NotFound,
            _ => ErrorClass::Validation,
        }
    }
}

/// Quantity bounds for carts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLimits {
    /// Maximum quantity of one line
    pub max_per_item: u32,

    /// Maximum total quantity across lines
    pub max_per_cart: u32,
}

impl Default for CartLimits {
    fn default() -> Self {
        Self {
            max_per_item: DEFAULT_MAX_QUANTITY_PER_ITEM,
            max_per_cart: DEFAULT_MAX_CART_QUANTITY,
        }
    }
}

/// One (product, variant, size) entry of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Cart line UUID
    pub uuid: CartLineUuid,

    /// Product UUID
    pub product_uuid: ProductUuid,

    /// Variant UUID
    pub variant_uuid: VariantUuid,

    /// Inventory UUID, unique within a cart
    pub inventory_uuid: InventoryUuid,

    /// Units in the cart
    pub quantity: u32,

    /// Sale price when added or last reconciled
    pub price_at_add: u64,

    /// Effective offer percentage for `price_at_add`
    pub offer_percent_at_add: u8,
}

impl CartLine {
    /// `price_at_add * quantity`
    pub fn line_total(&self) -> u64 {
        self.price_at_add.saturating_mul(u64::from(self.quantity))
    }
}

/// A request to put `quantity` of an inventory into the cart at `price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAddition {
    /// Product UUID
    pub product_uuid: ProductUuid,

    /// Variant UUID
    pub variant_uuid: VariantUuid,

    /// Inventory UUID
    pub inventory_uuid: InventoryUuid,

    /// Units to add
    pub quantity: u32,

    /// Current sale price
    pub price: u64,

    /// Effective offer percentage for `price`
    pub offer_percent: u8,
}

/// Single-step quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityAction {
    /// One more unit
    Increment,
    /// One fewer unit
    Decrement,
}

/// A user's cart.
///
/// Aggregates are derived: every mutation ends with [`Cart::recompute_totals`].
/// `version` is the optimistic concurrency token checked by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart UUID
    pub uuid: CartUuid,

    /// Owning user, one cart each
    pub user_uuid: UserUuid,

    /// Lines in insertion order
    pub lines: Vec<CartLine>,

    /// Sum of line quantities
    pub total_items: u32,

    /// Sum of line totals
    pub total_amount: u64,

    /// Write counter; zero until first stored
    pub version: u64,

    /// Creation time
    pub created_at: Timestamp,

    /// Last mutation time
    pub updated_at: Timestamp,
}

impl Cart {
    /// A new, empty cart that has never been stored.
    pub fn new(user_uuid: UserUuid, now: Timestamp) -> Self {
        Self {
            uuid: CartUuid::new(),
            user_uuid,
            lines: Vec::new(),
            total_items: 0,
            total_amount: 0,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// No lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line holding `inventory`.
    pub fn line(&self, inventory: InventoryUuid) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.inventory_uuid == inventory)
    }

    fn line_mut(&mut self, inventory: InventoryUuid) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.inventory_uuid == inventory)
    }

    /// Recompute `total_items` and `total_amount` from the current lines.
    pub fn recompute_totals(&mut self) {
        self.total_items = self
            .lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity));

        self.total_amount = self
            .lines
            .iter()
            .fold(0_u64, |acc, line| acc.saturating_add(line.line_total()));
    }

    /// Mark the cart as modified at `now`.
    pub fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
    }

    /// Add a line, merging into an existing line for the same inventory.
    ///
    /// A merged line takes the new price snapshot. `available` is the live stock.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] when the quantity is out of range, a limit would be
    /// exceeded, or stock is insufficient.
    pub fn add(
        &mut self,
        addition: LineAddition,
        available: u32,
        limits: &CartLimits,
    ) -> Result<(), CartError> {
        if addition.quantity == 0 || addition.quantity > limits.max_per_item {
            return Err(CartError::InvalidQuantity {
                max: limits.max_per_item,
            });
        }

        let current = self
            .line(addition.inventory_uuid)
            .map_or(0, |line| line.quantity);

        let quantity = current.saturating_add(addition.quantity);

        if quantity > limits.max_per_item {
            return Err(CartError::ItemLimit {
                max: limits.max_per_item,
            });
        }

        if quantity > available {
            return Err(CartError::InsufficientStock { available });
        }

        self.check_cart_limit(current, quantity, limits)?;

        match self.line_mut(addition.inventory_uuid) {
            Some(line) => {
                line.quantity = quantity;
                line.price_at_add = addition.price;
                line.offer_percent_at_add = addition.offer_percent;
            }
            None => self.lines.push(CartLine {
                uuid: CartLineUuid::new(),
                product_uuid: addition.product_uuid,
                variant_uuid: addition.variant_uuid,
                inventory_uuid: addition.inventory_uuid,
                quantity,
                price_at_add: addition.price,
                offer_percent_at_add: addition.offer_percent,
            }),
        }

        self.recompute_totals();

        Ok(())
    }

    /// Step a line's quantity up or down by one, returning the new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] when no line holds `inventory`, or a
    /// limit/stock error for the new quantity.
    pub fn adjust(
        &mut self,
        inventory: InventoryUuid,
        action: QuantityAction,
        available: u32,
        limits: &CartLimits,
    ) -> Result<u32, CartError> {
        let current = self
            .line(inventory)
            .map(|line| line.quantity)
            .ok_or(CartError::LineNotFound)?;

        let quantity = match action {
            QuantityAction::Increment => {
                let quantity = current.saturating_add(1);

                if quantity > limits.max_per_item {
                    return Err(CartError::ItemLimit {
                        max: limits.max_per_item,
                    });
                }

                if quantity > available {
                    return Err(CartError::InsufficientStock { available });
                }

                self.check_cart_limit(current, quantity, limits)?;

                quantity
            }
            QuantityAction::Decrement => {
                if current <= 1 {
                    return Err(CartError::BelowMinimum);
                }

                current - 1
            }
        };

        if let Some(line) = self.line_mut(inventory) {
            line.quantity = quantity;
        }

        self.recompute_totals();

        Ok(quantity)
    }

    /// Remove the line holding `inventory`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] when no line holds `inventory`.
    pub fn remove(&mut self, inventory: InventoryUuid) -> Result<CartLine, CartError> {
        let position = self
            .lines
            .iter()
            .position(|line| line.inventory_uuid == inventory)
            .ok_or(CartError::LineNotFound)?;

        let removed = self.lines.remove(position);

        self.recompute_totals();

        Ok(removed)
    }

    /// Empty the cart. The cart itself is kept.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.recompute_totals();
    }

    fn check_cart_limit(
        &self,
        current: u32,
        quantity: u32,
        limits: &CartLimits,
    ) -> Result<(), CartError> {
        let total = self
            .total_items
            .saturating_sub(current)
            .saturating_add(quantity);

        if total > limits.max_per_cart {
            return Err(CartError::CartLimit {
                max: limits.max_per_cart,
            });
        }

        Ok(())
    }
}
