//! Order Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{InventoryUuid, ProductUuid, VariantUuid},
    checkout::{OrderPricing, ValidatedLine},
    customers::{Address, User, UserUuid},
    orders::{
        number::OrderNumber,
        returns::ReturnReason,
        status::{Actor, ItemStatus, OrderStatus, PaymentMethod, PaymentStatus},
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItem>;

/// Customer details frozen at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    /// Customer name
    pub name: String,
    /// Customer email
    pub email: String,
}

impl From<&User> for CustomerSnapshot {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Shipping address frozen at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Recipient name
    pub full_name: String,
    /// Contact phone
    pub phone: String,
    /// Street line
    pub street_address: String,
    /// City
    pub city: String,
    /// State
    pub state: String,
    /// Postal code
    pub pincode: String,
    /// Country
    pub country: String,
}

impl From<&Address> for ShippingAddress {
    fn from(address: &Address) -> Self {
        Self {
            full_name: address.full_name.clone(),
            phone: address.phone.clone(),
            street_address: address.street_address.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            pincode: address.pincode.clone(),
            country: address.country.clone(),
        }
    }
}

/// How an order is paid and what was refunded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// How the customer pays
    pub method: PaymentMethod,
    /// Payment state
    pub status: PaymentStatus,
    /// Amount refunded so far
    pub refunded_amount: u64,
}

/// One entry of an item's audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Status entered
    pub status: ItemStatus,
    /// When it was entered
    pub at: Timestamp,
}

/// Why and by whom an item was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    /// Why the item was cancelled
    pub reason: String,
    /// Who cancelled it
    pub by: Actor,
    /// Cancellation time
    pub at: Timestamp,
}

/// Return sub-record of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnInfo {
    /// Return reason
    pub reason: ReturnReason,
    /// Customer comment
    pub comment: Option<String>,
    /// Evidence photo URLs
    pub photos: Vec<String>,
    /// Request time
    pub requested_at: Timestamp,
    /// Approval time
    pub approved_at: Option<Timestamp>,
    /// When the warehouse received it
    pub received_at: Option<Timestamp>,
    /// Rejection time
    pub rejected_at: Option<Timestamp>,
    /// Why the return was rejected
    pub rejection_reason: Option<String>,
}

/// A purchased line, frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Order item UUID
    pub uuid: OrderItemUuid,
    /// Product UUID
    pub product_uuid: ProductUuid,
    /// Variant UUID
    pub variant_uuid: VariantUuid,
    /// Inventory UUID, restocked on cancel or return
    pub inventory_uuid: InventoryUuid,
    /// Product name at purchase
    pub product_name: String,
    /// Variant color
    pub color: String,
    /// Inventory size
    pub size: String,
    /// Inventory SKU
    pub sku: String,
    /// Primary variant image
    pub image: Option<String>,
    /// Units bought
    pub quantity: u32,
    /// Sale price per unit
    pub unit_price: u64,
    /// `unit_price * quantity`
    pub line_total: u64,
    /// Item status
    pub status: ItemStatus,
    /// Every status the item has entered, oldest first
    pub timeline: Vec<StatusChange>,
    /// Set once the item is cancelled
    pub cancellation: Option<Cancellation>,
    /// Set once a return is requested
    pub return_info: Option<ReturnInfo>,
}

impl OrderItem {
    /// Snapshot a validated cart line as a `PENDING` item.
    pub fn from_line(line: &ValidatedLine<'_>, now: Timestamp) -> Self {
        Self {
            uuid: OrderItemUuid::new(),
            product_uuid: line.catalog.product.uuid,
            variant_uuid: line.catalog.variant.uuid,
            inventory_uuid: line.catalog.inventory.uuid,
            product_name: line.catalog.product.name.clone(),
            color: line.catalog.variant.color.clone(),
            size: line.catalog.inventory.size.clone(),
            sku: line.catalog.inventory.sku.clone(),
            image: line.catalog.variant.primary_image().map(str::to_string),
            quantity: line.line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total(),
            status: ItemStatus::Pending,
            timeline: vec![StatusChange {
                status: ItemStatus::Pending,
                at: now,
            }],
            cancellation: None,
            return_info: None,
        }
    }

    /// Move to `status`, appending to the timeline.
    pub(crate) fn set_status(&mut self, status: ItemStatus, now: Timestamp) {
        self.status = status;
        self.timeline.push(StatusChange { status, at: now });
    }

    /// When the item was last delivered, from its timeline.
    pub fn delivered_at(&self) -> Option<Timestamp> {
        self.timeline
            .iter()
            .rev()
            .find(|change| change.status == ItemStatus::Delivered)
            .map(|change| change.at)
    }
}

/// An order.
///
/// Only statuses, timelines and the cancellation/return sub-records change
/// after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order UUID
    pub uuid: OrderUuid,
    /// Human-facing order number
    pub number: OrderNumber,
    /// Purchasing user
    pub user_uuid: UserUuid,
    /// Customer snapshot
    pub customer: CustomerSnapshot,
    /// Address snapshot
    pub shipping_address: ShippingAddress,
    /// Payment record
    pub payment: Payment,
    /// Order status
    pub status: OrderStatus,
    /// Totals fixed at checkout
    pub pricing: OrderPricing,
    /// Purchased items
    pub items: Vec<OrderItem>,
    /// Placement time
    pub created_at: Timestamp,
    /// Last change
    pub updated_at: Timestamp,
    /// Set on delivery
    pub delivered_at: Option<Timestamp>,
    /// Set when fully cancelled
    pub cancelled_at: Option<Timestamp>,
}

/// Inputs for a new order.
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    /// Purchasing user
    pub user: &'a User,
    /// Shipping address
    pub address: &'a Address,
    /// Payment method
    pub method: PaymentMethod,
    /// Validated cart lines
    pub lines: &'a [ValidatedLine<'a>],
    /// Computed totals
    pub pricing: OrderPricing,
    /// Placement time
    pub now: Timestamp,
}

impl Order {
    /// Build a new `PENDING` order with a fresh number.
    pub fn place(new: &NewOrder<'_>) -> Self {
        Self {
            uuid: OrderUuid::new(),
            number: OrderNumber::generate(new.now),
            user_uuid: new.user.uuid,
            customer: CustomerSnapshot::from(new.user),
            shipping_address: ShippingAddress::from(new.address),
            payment: Payment {
                method: new.method,
                status: PaymentStatus::Pending,
                refunded_amount: 0,
            },
            status: OrderStatus::Pending,
            pricing: new.pricing,
            items: new
                .lines
                .iter()
                .map(|line| OrderItem::from_line(line, new.now))
                .collect(),
            created_at: new.now,
            updated_at: new.now,
            delivered_at: None,
            cancelled_at: None,
        }
    }

    /// Replace the order number, used when a generated number collides.
    pub fn renumber(&mut self) {
        self.number = OrderNumber::generate(self.created_at);
    }

    /// Look up an item by UUID.
    pub fn item(&self, uuid: OrderItemUuid) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.uuid == uuid)
    }

    pub(crate) fn item_mut(&mut self, uuid: OrderItemUuid) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|item| item.uuid == uuid)
    }
}
