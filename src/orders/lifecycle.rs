//! Order lifecycle
//!
//! Fulfillment, cancellation and return transitions. Every method validates
//! fully before mutating, so a rejected transition leaves the order untouched.
//! Stock to put back is returned as a list of [`Restock`] entries for the
//! caller to apply through the inventory store.

use jiff::Timestamp;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    catalog::InventoryUuid,
    errors::{Classify, ErrorClass},
    orders::{
        model::{Cancellation, Order, OrderItem, OrderItemUuid, ReturnInfo},
        returns::{ReturnPolicy, ReturnReason, ReturnRequest},
        status::{Actor, ItemStatus, OrderStatus, PaymentMethod, PaymentStatus},
    },
};

/// Stock to add back to one inventory row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Restock {
    /// Inventory to credit
    pub inventory: InventoryUuid,

    /// Units to add back
    pub quantity: u32,
}

/// Restocks produced by a single transition.
pub type Restocks = SmallVec<[Restock; 4]>;

/// Order lifecycle errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// The order status cannot move to the requested one.
    #[error("cannot change status from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// The item status cannot move to the requested one.
    #[error("cannot change item status from {from} to {to}")]
    InvalidItemTransition {
        /// Current status
        from: ItemStatus,
        /// Requested status
        to: ItemStatus,
    },

    /// No item with that UUID in the order.
    #[error("item not found in order")]
    ItemNotFound,

    /// Every item is past the cancellable stage.
    #[error("no items in this order can be cancelled")]
    NothingToCancel,

    /// A return is already open.
    #[error("return already requested for this item")]
    ReturnAlreadyRequested,

    /// A rejected return cannot be requested again.
    #[error("a return for this item was rejected and cannot be requested again")]
    ReturnPreviouslyRejected,

    /// Delivery was too long ago.
    #[error("the return window of {days} days has closed")]
    ReturnWindowClosed {
        /// Window length
        days: u16,
    },

    /// The reason needs photo evidence.
    #[error("a photo is required for return reason {reason}")]
    PhotoRequired {
        /// Reason given
        reason: ReturnReason,
    },

    /// Nothing in the order can be returned.
    #[error("no items in this order are eligible for return")]
    NoEligibleItems,

    /// Blank rejection reason.
    #[error("a rejection reason is required")]
    RejectionReasonRequired,
}

impl Classify for LifecycleError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::ItemNotFound => ErrorClass::NotFound,
            Self::PhotoRequired { .. } | Self::RejectionReasonRequired => ErrorClass::Validation,
            _ => ErrorClass::State,
        }
    }
}

const USER_CANCEL_REASON: &str = "Cancelled by user";
const ADMIN_CANCEL_REASON: &str = "Cancelled by admin";

fn cancel_reason(reason: Option<&str>, actor: Actor) -> String {
    match reason.map(str::trim) {
        Some(reason) if !reason.is_empty() => reason.to_string(),
        _ => match actor {
            Actor::User => USER_CANCEL_REASON.to_string(),
            Actor::Admin => ADMIN_CANCEL_REASON.to_string(),
        },
    }
}

impl OrderItem {
    fn cancel(&mut self, reason: String, by: Actor, now: Timestamp) -> Restock {
        self.set_status(ItemStatus::Cancelled, now);
        self.cancellation = Some(Cancellation {
            reason,
            by,
            at: now,
        });

        Restock {
            inventory: self.inventory_uuid,
            quantity: self.quantity,
        }
    }

    fn check_return_eligible(
        &self,
        policy: &ReturnPolicy,
        now: Timestamp,
    ) -> Result<(), LifecycleError> {
        match self.status {
            ItemStatus::Delivered => {}
            ItemStatus::ReturnRequested | ItemStatus::Returned => {
                return Err(LifecycleError::ReturnAlreadyRequested);
            }
            ItemStatus::ReturnRejected => return Err(LifecycleError::ReturnPreviouslyRejected),
            from => {
                return Err(LifecycleError::InvalidItemTransition {
                    from,
                    to: ItemStatus::ReturnRequested,
                });
            }
        }

        if self
            .return_info
            .as_ref()
            .is_some_and(|info| info.rejected_at.is_some())
        {
            return Err(LifecycleError::ReturnPreviouslyRejected);
        }

        let open = self
            .delivered_at()
            .is_some_and(|delivered_at| policy.is_open(delivered_at, now));

        if !open {
            return Err(LifecycleError::ReturnWindowClosed {
                days: policy.window_days,
            });
        }

        Ok(())
    }

    fn mark_return_requested(&mut self, request: &ReturnRequest, now: Timestamp) {
        self.set_status(ItemStatus::ReturnRequested, now);
        self.return_info = Some(ReturnInfo {
            reason: request.reason,
            comment: request
                .comment
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            photos: request
                .photos
                .iter()
                .filter(|p| !p.trim().is_empty())
                .cloned()
                .collect(),
            requested_at: now,
            approved_at: None,
            received_at: None,
            rejected_at: None,
            rejection_reason: None,
        });
    }
}

fn require_evidence(request: &ReturnRequest) -> Result<(), LifecycleError> {
    if request.has_required_evidence() {
        Ok(())
    } else {
        Err(LifecycleError::PhotoRequired {
            reason: request.reason,
        })
    }
}

impl Order {
    fn item_or_not_found(&mut self, uuid: OrderItemUuid) -> Result<&mut OrderItem, LifecycleError> {
        self.item_mut(uuid).ok_or(LifecycleError::ItemNotFound)
    }

    fn cascade_cancellation(&mut self, now: Timestamp) {
        if self
            .items
            .iter()
            .all(|item| item.status == ItemStatus::Cancelled)
        {
            self.status = OrderStatus::Cancelled;
            self.cancelled_at = Some(now);
        }
    }

    /// Non-cancelled items, the ones payment and refunds are about.
    fn live_items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items
            .iter()
            .filter(|item| item.status != ItemStatus::Cancelled)
    }

    /// Admin fulfillment transition.
    ///
    /// Applies to every item currently in the order's status; cancelled and
    /// returned items are skipped. Moving to `CANCELLED` cancels each pending
    /// item on behalf of the admin. Cash-on-delivery payments become `PAID`
    /// once every live item is delivered.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidTransition`] for transitions outside
    /// the allowed table.
    pub fn update_status(
        &mut self,
        next: OrderStatus,
        now: Timestamp,
    ) -> Result<Restocks, LifecycleError> {
        if !self.status.can_transition_to(next) {
            return Err(LifecycleError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        let current = ItemStatus::from(self.status);
        let mut restocks = Restocks::new();

        for item in self.items.iter_mut().filter(|item| item.status == current) {
            if next == OrderStatus::Cancelled {
                restocks.push(item.cancel(cancel_reason(None, Actor::Admin), Actor::Admin, now));
            } else {
                item.set_status(ItemStatus::from(next), now);
            }
        }

        self.status = next;
        self.updated_at = now;

        match next {
            OrderStatus::Delivered => {
                self.delivered_at = Some(now);

                let all_delivered = self
                    .live_items()
                    .all(|item| item.status == ItemStatus::Delivered);

                if all_delivered
                    && self.payment.method == PaymentMethod::Cod
                    && self.payment.status == PaymentStatus::Pending
                {
                    self.payment.status = PaymentStatus::Paid;
                }
            }
            OrderStatus::Cancelled => self.cancelled_at = Some(now),
            _ => {}
        }

        Ok(restocks)
    }

    /// Cancel one pending item.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::ItemNotFound`] or, when the item is no longer
    /// pending, [`LifecycleError::InvalidItemTransition`].
    pub fn cancel_item(
        &mut self,
        item: OrderItemUuid,
        reason: Option<&str>,
        actor: Actor,
        now: Timestamp,
    ) -> Result<Restock, LifecycleError> {
        let item = self.item_or_not_found(item)?;

        if item.status != ItemStatus::Pending {
            return Err(LifecycleError::InvalidItemTransition {
                from: item.status,
                to: ItemStatus::Cancelled,
            });
        }

        let restock = item.cancel(cancel_reason(reason, actor), actor, now);

        self.updated_at = now;
        self.cascade_cancellation(now);

        Ok(restock)
    }

    /// Cancel every pending item.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NothingToCancel`] when no item is pending.
    pub fn cancel_order(
        &mut self,
        reason: Option<&str>,
        actor: Actor,
        now: Timestamp,
    ) -> Result<Restocks, LifecycleError> {
        let reason = cancel_reason(reason, actor);

        let restocks: Restocks = self
            .items
            .iter_mut()
            .filter(|item| item.status == ItemStatus::Pending)
            .map(|item| item.cancel(reason.clone(), actor, now))
            .collect();

        if restocks.is_empty() {
            return Err(LifecycleError::NothingToCancel);
        }

        self.updated_at = now;
        self.cascade_cancellation(now);

        Ok(restocks)
    }

    /// Request a return for one delivered item.
    ///
    /// # Errors
    ///
    /// Returns an eligibility error, or [`LifecycleError::PhotoRequired`] when
    /// the reason needs evidence and none was supplied.
    pub fn request_return(
        &mut self,
        item: OrderItemUuid,
        request: &ReturnRequest,
        policy: &ReturnPolicy,
        now: Timestamp,
    ) -> Result<(), LifecycleError> {
        let item = self.item_or_not_found(item)?;

        item.check_return_eligible(policy, now)?;
        require_evidence(request)?;
        item.mark_return_requested(request, now);

        self.updated_at = now;

        Ok(())
    }

    /// Request a return for every eligible item, returning how many were requested.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::PhotoRequired`] for a request without
    /// required evidence, or [`LifecycleError::NoEligibleItems`].
    pub fn request_order_return(
        &mut self,
        request: &ReturnRequest,
        policy: &ReturnPolicy,
        now: Timestamp,
    ) -> Result<usize, LifecycleError> {
        require_evidence(request)?;

        let mut requested = 0;

        for item in &mut self.items {
            if item.check_return_eligible(policy, now).is_ok() {
                item.mark_return_requested(request, now);
                requested += 1;
            }
        }

        if requested == 0 {
            return Err(LifecycleError::NoEligibleItems);
        }

        self.updated_at = now;

        Ok(requested)
    }

    /// Approve a requested return and restock the item.
    ///
    /// The order-level status is left as is. On a paid order the line total is
    /// recorded as refunded, and the payment becomes `REFUNDED` once every
    /// live item is returned.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidItemTransition`] when no return is pending.
    pub fn approve_return(
        &mut self,
        item: OrderItemUuid,
        now: Timestamp,
    ) -> Result<Restock, LifecycleError> {
        let item = self.item_or_not_found(item)?;

        if item.status != ItemStatus::ReturnRequested {
            return Err(LifecycleError::InvalidItemTransition {
                from: item.status,
                to: ItemStatus::Returned,
            });
        }

        item.set_status(ItemStatus::Returned, now);

        if let Some(info) = item.return_info.as_mut() {
            info.approved_at = Some(now);
            info.received_at = Some(now);
        }

        let line_total = item.line_total;
        let restock = Restock {
            inventory: item.inventory_uuid,
            quantity: item.quantity,
        };

        if self.payment.status == PaymentStatus::Paid {
            self.payment.refunded_amount = self.payment.refunded_amount.saturating_add(line_total);

            if self
                .live_items()
                .all(|item| item.status == ItemStatus::Returned)
            {
                self.payment.status = PaymentStatus::Refunded;
            }
        }

        self.updated_at = now;

        Ok(restock)
    }

    /// Reject a requested return. The item can never be returned afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::ItemNotFound`], then
    /// [`LifecycleError::RejectionReasonRequired`] for a blank reason, or
    /// [`LifecycleError::InvalidItemTransition`] when no return is pending.
    pub fn reject_return(
        &mut self,
        item: OrderItemUuid,
        reason: &str,
        now: Timestamp,
    ) -> Result<(), LifecycleError> {
        let item = self.item_or_not_found(item)?;
        let reason = reason.trim();

        if reason.is_empty() {
            return Err(LifecycleError::RejectionReasonRequired);
        }

        if item.status != ItemStatus::ReturnRequested {
            return Err(LifecycleError::InvalidItemTransition {
                from: item.status,
                to: ItemStatus::ReturnRejected,
            });
        }

        item.set_status(ItemStatus::ReturnRejected, now);

        if let Some(info) = item.return_info.as_mut() {
            info.rejected_at = Some(now);
            info.rejection_reason = Some(reason.to_string());
        }

        self.updated_at = now;

        Ok(())
    }
}
