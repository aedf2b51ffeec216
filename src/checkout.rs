//! Checkout rules
//!
//! Line re-validation and the order pricing breakdown. The orchestration
//! (stock reservation, persistence) lives in the application layer.

use jiff::Timestamp;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    carts::{Cart, CartLine},
    catalog::{CatalogSnapshot, ResolvedLine, Unavailable},
    errors::{Classify, ErrorClass},
    pricing,
};

/// Default tax rate applied to the order subtotal.
pub const DEFAULT_TAX_PERCENT: u8 = 18;

/// Default flat shipping charge.
pub const DEFAULT_SHIPPING_CHARGE: u64 = 0;

/// Tax and shipping applied to every order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutPolicy {
    /// Tax rate charged on the subtotal
    pub tax_percent: u8,

    /// Flat shipping charge per order
    pub shipping_charge: u64,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            tax_percent: DEFAULT_TAX_PERCENT,
            shipping_charge: DEFAULT_SHIPPING_CHARGE,
        }
    }
}

/// Why a cart line cannot be checked out. Messages name the line.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LineProblem {
    /// A catalog record behind the line can no longer be sold.
    #[error("{product_name} is no longer available: {reason}")]
    Unavailable {
        /// Product name, or a placeholder when the product is gone
        product_name: String,
        /// First failing availability check
        reason: Unavailable,
    },

    /// Stock no longer covers the line quantity.
    #[error("{product_name}: Only {available} available for size {size}, color {color}")]
    InsufficientStock {
        /// Product name
        product_name: String,
        /// Size label
        size: String,
        /// Variant color
        color: String,
        /// Units on hand
        available: u32,
    },

    /// The sale price moved since the line was priced.
    #[error("price of {product_name} changed from ₹{expected} to ₹{current}")]
    PriceChanged {
        /// Product name
        product_name: String,
        /// Price snapshot on the cart line
        expected: u64,
        /// Current sale price
        current: u64,
    },
}

impl Classify for LineProblem {
    fn class(&self) -> ErrorClass {
        ErrorClass::Conflict
    }
}

/// A cart line that passed every checkout check.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedLine<'a> {
    /// The cart line
    pub line: &'a CartLine,

    /// Catalog records the line resolved to
    pub catalog: ResolvedLine<'a>,

    /// Sale price at validation time
    pub unit_price: u64,
}

impl ValidatedLine<'_> {
    /// `unit_price * quantity`
    pub fn line_total(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.line.quantity))
    }
}

/// Re-check every line of `cart` against `catalog`.
///
/// # Errors
///
/// Returns the [`LineProblem`] for the first line that fails.
pub fn validate_lines<'a>(
    cart: &'a Cart,
    catalog: &'a CatalogSnapshot,
    now: Timestamp,
) -> Result<Vec<ValidatedLine<'a>>, LineProblem> {
    cart.lines
        .iter()
        .map(|line| validate_line(line, catalog, now))
        .collect()
}

fn validate_line<'a>(
    line: &'a CartLine,
    catalog: &'a CatalogSnapshot,
    now: Timestamp,
) -> Result<ValidatedLine<'a>, LineProblem> {
    let product_name = || {
        catalog
            .product(line.product_uuid)
            .map_or_else(|| "Unknown product".to_string(), |p| p.name.clone())
    };

    let resolved = catalog
        .resolve(line.product_uuid, line.variant_uuid, line.inventory_uuid)
        .map_err(|reason| LineProblem::Unavailable {
            product_name: product_name(),
            reason,
        })?;

    if resolved.inventory.stock < line.quantity {
        return Err(LineProblem::InsufficientStock {
            product_name: product_name(),
            size: resolved.inventory.size.clone(),
            color: resolved.variant.color.clone(),
            available: resolved.inventory.stock,
        });
    }

    let unit_price = resolved.price(now);

    if unit_price != line.price_at_add {
        return Err(LineProblem::PriceChanged {
            product_name: product_name(),
            expected: line.price_at_add,
            current: unit_price,
        });
    }

    Ok(ValidatedLine {
        line,
        catalog: resolved,
        unit_price,
    })
}

/// Order pricing breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPricing {
    /// Sum of line totals
    pub subtotal: u64,

    /// Tax on the subtotal
    pub tax: u64,

    /// Tax rate applied
    pub tax_percent: u8,

    /// Shipping charge
    pub shipping_charge: u64,

    /// Coupon discount
    pub discount: u64,

    /// Amount payable
    pub total_amount: u64,
}

impl OrderPricing {
    /// Price an order. Tax is charged on the full subtotal; the discount is
    /// capped at the subtotal.
    pub fn compute(subtotal: u64, discount: u64, policy: &CheckoutPolicy) -> Self {
        let tax = pricing::percent_of(subtotal, policy.tax_percent);
        let discount = discount.min(subtotal);

        Self {
            subtotal,
            tax,
            tax_percent: policy.tax_percent,
            shipping_charge: policy.shipping_charge,
            discount,
            total_amount: subtotal
                .saturating_add(tax)
                .saturating_add(policy.shipping_charge)
                .saturating_sub(discount),
        }
    }
}

/// Discount granted by a percentage coupon, bounded by `max_discount` and by
/// the subtotal itself. Fractions are truncated.
pub fn coupon_discount(subtotal: u64, percent: u8, max_discount: u64) -> u64 {
    let raw = (Decimal::from(subtotal) * Decimal::from(percent) / Decimal::ONE_HUNDRED)
        .trunc()
        .to_u64()
        .unwrap_or(u64::MAX);

    raw.min(max_discount).min(subtotal)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::{
        carts::{CartLimits, LineAddition},
        catalog::fixtures::Shoe,
        customers::UserUuid,
    };

    fn cart_for(shoe: &Shoe, quantity: u32, price: u64) -> TestResult<Cart> {
        let mut cart = Cart::new(UserUuid::new(), Timestamp::now());

        cart.add(
            LineAddition {
                product_uuid: shoe.product,
                variant_uuid: shoe.variant,
                inventory_uuid: shoe.inventory,
                quantity,
                price,
                offer_percent: 0,
            },
            quantity,
            &CartLimits::default(),
        )?;

        Ok(cart)
    }

    #[test]
    fn validated_lines_carry_totals() -> TestResult {
        let shoe = Shoe::new(1500, 4);
        let cart = cart_for(&shoe, 3, 1500)?;

        let lines = validate_lines(&cart, &shoe.snapshot, Timestamp::now())?;

        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().map(ValidatedLine::line_total), Some(4500));

        Ok(())
    }

    #[test]
    fn insufficient_stock_names_the_line() -> TestResult {
        let mut shoe = Shoe::new(1500, 4);
        let cart = cart_for(&shoe, 3, 1500)?;
        shoe.inventory_mut().ok_or("missing inventory")?.stock = 2;

        let result = validate_lines(&cart, &shoe.snapshot, Timestamp::now());
        let error = result.err().ok_or("expected a problem")?;

        assert_eq!(
            error.to_string(),
            "Runner: Only 2 available for size 9, color Black"
        );
        assert_eq!(error.class(), ErrorClass::Conflict);

        Ok(())
    }

    #[test]
    fn stale_price_is_a_problem() -> TestResult {
        let shoe = Shoe::new(1500, 4);
        let cart = cart_for(&shoe, 1, 1200)?;

        let result = validate_lines(&cart, &shoe.snapshot, Timestamp::now());

        assert!(
            matches!(result, Err(LineProblem::PriceChanged { current: 1500, .. })),
            "expected PriceChanged, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn pricing_adds_tax_and_shipping_then_subtracts_discount() {
        let policy = CheckoutPolicy {
            tax_percent: 18,
            shipping_charge: 50,
        };

        let pricing = OrderPricing::compute(1499, 100, &policy);

        assert_eq!(pricing.tax, 270);
        assert_eq!(pricing.total_amount, 1499 + 270 + 50 - 100);
    }

    #[test]
    fn default_policy_is_eighteen_percent_free_shipping() {
        let pricing = OrderPricing::compute(2000, 0, &CheckoutPolicy::default());

        assert_eq!(pricing.tax, 360);
        assert_eq!(pricing.shipping_charge, 0);
        assert_eq!(pricing.total_amount, 2360);
    }

    #[test]
    fn discount_never_exceeds_subtotal() {
        let pricing = OrderPricing::compute(300, 1000, &CheckoutPolicy::default());

        assert_eq!(pricing.discount, 300);
        assert_eq!(pricing.total_amount, pricing.tax);
    }

    #[test]
    fn coupon_discount_is_capped() {
        assert_eq!(coupon_discount(2000, 10, 500), 200);
        assert_eq!(coupon_discount(10_000, 10, 500), 500);
        assert_eq!(coupon_discount(100, 100, 500), 100);
        assert_eq!(coupon_discount(999, 15, 1000), 149);
    }
}
