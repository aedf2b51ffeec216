//! Cart reconciliation
//!
//! Re-validates a stored cart against a [`CatalogSnapshot`]. Catalog drift is
//! reported as data, never as an error.

use std::fmt::{self, Display};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    carts::{Cart, CartLine},
    catalog::{CatalogSnapshot, Unavailable},
};

/// What reconciliation did to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    /// The line can no longer be sold and was dropped.
    Removed,

    /// Stock ran out and the line was dropped.
    OutOfStock,

    /// Quantity was clamped to stock, possibly repriced too.
    QuantityUpdated,

    /// The price snapshot was refreshed.
    PriceUpdated,
}

impl ChangeKind {
    /// Serialised label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Removed => "REMOVED",
            Self::OutOfStock => "OUT_OF_STOCK",
            Self::QuantityUpdated => "QUANTITY_UPDATED",
            Self::PriceUpdated => "PRICE_UPDATED",
        }
    }
}

impl Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One change record. Each line yields at most one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartChange {
    /// What happened to the line
    #[serde(rename = "type")]
    pub kind: ChangeKind,

    /// Product name, or a placeholder when the product is gone
    pub product_name: String,

    /// Customer-facing explanation
    pub reason: String,
}

/// Outcome of reconciling one cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The repaired cart
    pub cart: Cart,

    /// Changes in line order
    pub changes: Vec<CartChange>,
}

impl Reconciliation {
    /// Whether the cart must be written back.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

enum LineOutcome {
    Keep(Option<CartChange>),
    Drop(CartChange),
}

/// Reconcile `cart` against `catalog` at `now`.
///
/// Lines are judged in order. The first failing check decides the line's
/// fate: missing, delisted or inactive product/variant/inventory removes it,
/// an unavailable category removes it, zero stock removes it, excess quantity
/// is clamped to stock, and a stale price snapshot is refreshed. When a line
/// is both clamped and repriced, both repairs are applied and reported in one
/// `QUANTITY_UPDATED` record.
///
/// Aggregates are recomputed from the surviving lines.
pub fn reconcile(mut cart: Cart, catalog: &CatalogSnapshot, now: Timestamp) -> Reconciliation {
    let mut changes = Vec::new();
    let lines = std::mem::take(&mut cart.lines);

    for mut line in lines {
        match reconcile_line(&mut line, catalog, now) {
            LineOutcome::Keep(change) => {
                changes.extend(change);
                cart.lines.push(line);
            }
            LineOutcome::Drop(change) => changes.push(change),
        }
    }

    cart.recompute_totals();

    Reconciliation { cart, changes }
}

fn reconcile_line(line: &mut CartLine, catalog: &CatalogSnapshot, now: Timestamp) -> LineOutcome {
    let product_name = catalog
        .product(line.product_uuid)
        .map_or_else(|| "Unknown product".to_string(), |p| p.name.clone());

    let size = catalog
        .inventory(line.inventory_uuid)
        .map_or("N/A", |i| i.size.as_str());

    let color = catalog
        .variant(line.variant_uuid)
        .map_or("N/A", |v| v.color.as_str());

    let change = |kind, reason| CartChange {
        kind,
        product_name: product_name.clone(),
        reason,
    };

    let resolved = match catalog.resolve(line.product_uuid, line.variant_uuid, line.inventory_uuid)
    {
        Ok(resolved) => resolved,
        Err(Unavailable::CategoryUnavailable) => {
            return LineOutcome::Drop(change(
                ChangeKind::Removed,
                "Product is no longer available".to_string(),
            ));
        }
        Err(_) => {
            return LineOutcome::Drop(change(
                ChangeKind::Removed,
                format!("Size UK {size}, Color {color} is no longer available"),
            ));
        }
    };

    let stock = resolved.inventory.stock;

    if stock == 0 {
        return LineOutcome::Drop(change(
            ChangeKind::OutOfStock,
            format!("Size UK {size}, Color {color} is out of stock"),
        ));
    }

    let price = resolved.price(now);
    let old_price = line.price_at_add;
    let repriced = price != old_price;

    if repriced {
        line.price_at_add = price;
        line.offer_percent_at_add = resolved.offer_percent(now);
    }

    if line.quantity > stock {
        line.quantity = stock;

        let mut reason = format!("Size UK {size}, Color {color} quantity reduced to {stock}");

        if repriced {
            reason.push_str(&format!("; price updated from ₹{old_price} to ₹{price}"));
        }

        return LineOutcome::Keep(Some(change(ChangeKind::QuantityUpdated, reason)));
    }

    if repriced {
        return LineOutcome::Keep(Some(change(
            ChangeKind::PriceUpdated,
            format!("Price updated from ₹{old_price} to ₹{price}"),
        )));
    }

    LineOutcome::Keep(None)
}
