//! Orders

#[macro_use]
pub mod status;

pub mod lifecycle;
pub mod model;
pub mod number;
pub mod returns;

pub use lifecycle::{LifecycleError, Restock, Restocks};
pub use model::{
    Cancellation, CustomerSnapshot, NewOrder, Order, OrderItem, OrderItemUuid, OrderUuid, Payment,
    ReturnInfo, ShippingAddress, StatusChange,
};
pub use number::OrderNumber;
pub use returns::{ReturnPolicy, ReturnReason, ReturnRequest};
pub use status::{Actor, ItemStatus, OrderStatus, PaymentMethod, PaymentStatus};
