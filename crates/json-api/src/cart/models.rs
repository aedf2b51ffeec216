//! Cart Models

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront::{
    carts::{Cart, CartLine},
    reconcile::{CartChange, Reconciliation},
};

/// Cart Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartLineResponse {
    /// The unique identifier of the line
    pub uuid: Uuid,

    pub product_uuid: Uuid,

    pub variant_uuid: Uuid,

    /// The size the line reserves
    pub inventory_uuid: Uuid,

    pub quantity: u32,

    /// Unit price captured when the line was last priced
    pub price_at_add: u64,

    /// Offer percentage included in `priceAtAdd`
    pub offer_percent_at_add: u8,

    /// `priceAtAdd × quantity`
    pub line_total: u64,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        Self {
            uuid: line.uuid.into_uuid(),
            product_uuid: line.product_uuid.into_uuid(),
            variant_uuid: line.variant_uuid.into_uuid(),
            inventory_uuid: line.inventory_uuid.into_uuid(),
            quantity: line.quantity,
            price_at_add: line.price_at_add,
            offer_percent_at_add: line.offer_percent_at_add,
            line_total: line.line_total(),
        }
    }
}

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartResponse {
    /// The unique identifier of the cart, absent when the user has none yet
    pub uuid: Option<Uuid>,

    pub items: Vec<CartLineResponse>,

    /// Sum of line quantities
    pub total_items: u32,

    /// Sum of line totals
    pub total_amount: u64,

    /// The date and time the cart was last updated
    pub updated_at: Option<String>,
}

impl CartResponse {
    /// The shape returned for a user who never had a cart.
    pub(crate) fn empty() -> Self {
        Self {
            uuid: None,
            items: Vec::new(),
            total_items: 0,
            total_amount: 0,
            updated_at: None,
        }
    }
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            uuid: Some(cart.uuid.into_uuid()),
            items: cart.lines.into_iter().map(CartLineResponse::from).collect(),
            total_items: cart.total_items,
            total_amount: cart.total_amount,
            updated_at: Some(cart.updated_at.to_string()),
        }
    }
}

/// Change Response
///
/// One adjustment made while reconciling the cart against the catalog.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangeResponse {
    /// `REMOVED`, `OUT_OF_STOCK`, `QUANTITY_UPDATED` or `PRICE_UPDATED`
    #[serde(rename = "type")]
    pub kind: String,

    pub product_name: String,

    /// Human readable explanation
    pub reason: String,
}

impl From<CartChange> for ChangeResponse {
    fn from(change: CartChange) -> Self {
        Self {
            kind: change.kind.as_str().to_string(),
            product_name: change.product_name,
            reason: change.reason,
        }
    }
}

/// Cart View Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartViewResponse {
    pub cart: CartResponse,

    /// Whether reconciliation changed the cart on this request
    pub has_changes: bool,

    pub changes: Vec<ChangeResponse>,
}

impl From<Option<Reconciliation>> for CartViewResponse {
    fn from(reconciliation: Option<Reconciliation>) -> Self {
        let Some(reconciliation) = reconciliation else {
            return Self {
                cart: CartResponse::empty(),
                has_changes: false,
                changes: Vec::new(),
            };
        };

        Self {
            has_changes: reconciliation.has_changes(),
            cart: reconciliation.cart.into(),
            changes: reconciliation
                .changes
                .into_iter()
                .map(ChangeResponse::from)
                .collect(),
        }
    }
}
