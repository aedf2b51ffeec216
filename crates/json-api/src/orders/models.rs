//! Order Models

use std::string::ToString;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront::{
    checkout::OrderPricing,
    orders::{
        Cancellation, CustomerSnapshot, Order, OrderItem, Payment, ReturnInfo, ShippingAddress,
        StatusChange,
    },
};

/// Customer Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CustomerResponse {
    pub name: String,
    pub email: String,
}

impl From<CustomerSnapshot> for CustomerResponse {
    fn from(customer: CustomerSnapshot) -> Self {
        Self {
            name: customer.name,
            email: customer.email,
        }
    }
}

/// Shipping Address Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ShippingAddressResponse {
    pub full_name: String,
    pub phone: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
}

impl From<ShippingAddress> for ShippingAddressResponse {
    fn from(address: ShippingAddress) -> Self {
        Self {
            full_name: address.full_name,
            phone: address.phone,
            street_address: address.street_address,
            city: address.city,
            state: address.state,
            pincode: address.pincode,
            country: address.country,
        }
    }
}

/// Payment Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentResponse {
    /// `COD`, `RAZORPAY` or `WALLET`
    pub method: String,

    /// `PENDING`, `PAID`, `FAILED` or `REFUNDED`
    pub status: String,

    /// Total of approved returns on a paid order
    pub refunded_amount: u64,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            method: payment.method.to_string(),
            status: payment.status.to_string(),
            refunded_amount: payment.refunded_amount,
        }
    }
}

/// Pricing Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PricingResponse {
    pub subtotal: u64,
    pub tax: u64,
    pub tax_percent: u8,
    pub shipping_charge: u64,
    pub discount: u64,
    pub total_amount: u64,
}

impl From<OrderPricing> for PricingResponse {
    fn from(pricing: OrderPricing) -> Self {
        Self {
            subtotal: pricing.subtotal,
            tax: pricing.tax,
            tax_percent: pricing.tax_percent,
            shipping_charge: pricing.shipping_charge,
            discount: pricing.discount,
            total_amount: pricing.total_amount,
        }
    }
}

/// Status Change Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct StatusChangeResponse {
    pub status: String,
    pub at: String,
}

impl From<StatusChange> for StatusChangeResponse {
    fn from(change: StatusChange) -> Self {
        Self {
            status: change.status.to_string(),
            at: change.at.to_string(),
        }
    }
}

/// Cancellation Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CancellationResponse {
    pub reason: String,

    /// `USER` or `ADMIN`
    pub by: String,

    pub at: String,
}

impl From<Cancellation> for CancellationResponse {
    fn from(cancellation: Cancellation) -> Self {
        Self {
            reason: cancellation.reason,
            by: cancellation.by.to_string(),
            at: cancellation.at.to_string(),
        }
    }
}

/// Return Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReturnInfoResponse {
    pub reason: String,
    pub comment: Option<String>,
    pub photos: Vec<String>,
    pub requested_at: String,
    pub approved_at: Option<String>,
    pub received_at: Option<String>,
    pub rejected_at: Option<String>,
    pub rejection_reason: Option<String>,
}

impl From<ReturnInfo> for ReturnInfoResponse {
    fn from(info: ReturnInfo) -> Self {
        Self {
            reason: info.reason.to_string(),
            comment: info.comment,
            photos: info.photos,
            requested_at: info.requested_at.to_string(),
            approved_at: info.approved_at.as_ref().map(ToString::to_string),
            received_at: info.received_at.as_ref().map(ToString::to_string),
            rejected_at: info.rejected_at.as_ref().map(ToString::to_string),
            rejection_reason: info.rejection_reason,
        }
    }
}

/// Order Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderItemResponse {
    /// The unique identifier of the item, used by cancel and return endpoints
    pub uuid: Uuid,

    pub product_uuid: Uuid,
    pub variant_uuid: Uuid,
    pub inventory_uuid: Uuid,
    pub product_name: String,
    pub color: String,
    pub size: String,
    pub sku: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub unit_price: u64,
    pub line_total: u64,
    pub status: String,
    pub timeline: Vec<StatusChangeResponse>,
    pub cancellation: Option<CancellationResponse>,
    pub return_info: Option<ReturnInfoResponse>,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            uuid: item.uuid.into_uuid(),
            product_uuid: item.product_uuid.into_uuid(),
            variant_uuid: item.variant_uuid.into_uuid(),
            inventory_uuid: item.inventory_uuid.into_uuid(),
            product_name: item.product_name,
            color: item.color,
            size: item.size,
            sku: item.sku,
            image: item.image,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total,
            status: item.status.to_string(),
            timeline: item
                .timeline
                .into_iter()
                .map(StatusChangeResponse::from)
                .collect(),
            cancellation: item.cancellation.map(CancellationResponse::from),
            return_info: item.return_info.map(ReturnInfoResponse::from),
        }
    }
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,

    /// Human readable order number, `ORD-YYYYMMDD-XXXXXX`
    pub order_id: String,

    /// `PENDING`, `SHIPPED`, `OUT_FOR_DELIVERY`, `DELIVERED` or `CANCELLED`
    pub status: String,

    pub customer: CustomerResponse,
    pub shipping_address: ShippingAddressResponse,
    pub payment: PaymentResponse,
    pub pricing: PricingResponse,
    pub items: Vec<OrderItemResponse>,
    pub created_at: String,
    pub updated_at: String,
    pub delivered_at: Option<String>,
    pub cancelled_at: Option<String>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            uuid: order.uuid.into_uuid(),
            order_id: order.number.to_string(),
            status: order.status.to_string(),
            customer: order.customer.into(),
            shipping_address: order.shipping_address.into(),
            payment: order.payment.into(),
            pricing: order.pricing.into(),
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
            delivered_at: order.delivered_at.as_ref().map(ToString::to_string),
            cancelled_at: order.cancelled_at.as_ref().map(ToString::to_string),
        }
    }
}

/// Orders Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrdersResponse {
    /// The caller's orders, newest first
    pub orders: Vec<OrderResponse>,
}
