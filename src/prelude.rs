//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    carts::{Cart, CartError, CartLimits, CartLine, CartUuid, LineAddition, QuantityAction},
    catalog::{
        CatalogSnapshot, Category, CategoryUuid, Inventory, InventoryUuid, Product, ProductUuid,
        Unavailable, Variant, VariantUuid,
    },
    checkout::{CheckoutPolicy, LineProblem, OrderPricing, coupon_discount, validate_lines},
    customers::{Address, AddressUuid, User, UserUuid},
    errors::{Classify, ErrorClass},
    orders::{
        Actor, ItemStatus, LifecycleError, NewOrder, Order, OrderItem, OrderItemUuid,
        OrderNumber, OrderStatus, OrderUuid, PaymentMethod, PaymentStatus, Restock, Restocks,
        ReturnPolicy, ReturnReason, ReturnRequest,
    },
    pricing::{Offer, PricingError, final_price},
    reconcile::{CartChange, ChangeKind, Reconciliation, reconcile},
};
