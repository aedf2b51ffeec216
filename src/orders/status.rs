//! Order statuses

use thiserror::Error;

/// Raised when a stored or requested status string is not recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        pub enum $name {
            $(
                #[doc = concat!("`", $label, "`")]
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stored and serialised label.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::orders::status::UnknownStatus;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($label => Ok(Self::$variant),)+
                    other => Err($crate::orders::status::UnknownStatus(other.to_string())),
                }
            }
        }
    };
}

status_enum! {
    /// Per-item status across fulfillment, cancellation and returns.
    ItemStatus {
        Pending => "PENDING",
        Shipped => "SHIPPED",
        OutForDelivery => "OUT_FOR_DELIVERY",
        Delivered => "DELIVERED",
        Cancelled => "CANCELLED",
        ReturnRequested => "RETURN_REQUESTED",
        Returned => "RETURNED",
        ReturnRejected => "RETURN_REJECTED",
    }
}

status_enum! {
    /// Order-level fulfillment status.
    OrderStatus {
        Pending => "PENDING",
        Shipped => "SHIPPED",
        OutForDelivery => "OUT_FOR_DELIVERY",
        Delivered => "DELIVERED",
        Cancelled => "CANCELLED",
    }
}

status_enum! {
    PaymentStatus {
        Pending => "PENDING",
        Paid => "PAID",
        Failed => "FAILED",
        Refunded => "REFUNDED",
    }
}

status_enum! {
    /// Payment method recorded on the order. Only cash on delivery can be placed.
    PaymentMethod {
        Cod => "COD",
        Razorpay => "RAZORPAY",
        Wallet => "WALLET",
    }
}

status_enum! {
    /// Who performed a cancellation.
    Actor {
        User => "USER",
        Admin => "ADMIN",
    }
}

impl OrderStatus {
    /// Admin transitions permitted from this status.
    pub const fn next(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Shipped, Self::Cancelled],
            Self::Shipped => &[Self::OutForDelivery],
            Self::OutForDelivery => &[Self::Delivered],
            Self::Delivered | Self::Cancelled => &[],
        }
    }

    /// Whether `next` is an allowed successor.
    pub fn can_transition_to(self, next: Self) -> bool {
        self.next().contains(&next)
    }

    /// No further transitions.
    pub fn is_terminal(self) -> bool {
        self.next().is_empty()
    }
}

impl From<OrderStatus> for ItemStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Pending => Self::Pending,
            OrderStatus::Shipped => Self::Shipped,
            OrderStatus::OutForDelivery => Self::OutForDelivery,
            OrderStatus::Delivered => Self::Delivered,
            OrderStatus::Cancelled => Self::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn labels_round_trip_through_from_str() -> TestResult {
        for status in ItemStatus::ALL {
            assert_eq!(status.as_str().parse::<ItemStatus>()?, *status);
        }

        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>()?, *status);
        }

        Ok(())
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert_eq!(
            "LOST".parse::<OrderStatus>(),
            Err(UnknownStatus("LOST".to_string()))
        );
    }

    #[test]
    fn serde_uses_stored_labels() -> TestResult {
        assert_eq!(
            serde_json::to_string(&ItemStatus::OutForDelivery)?,
            "\"OUT_FOR_DELIVERY\""
        );
        assert_eq!(
            serde_json::from_str::<PaymentMethod>("\"COD\"")?,
            PaymentMethod::Cod
        );

        Ok(())
    }

    #[test]
    fn transition_table() {
        use OrderStatus::*;

        assert!(Pending.can_transition_to(Shipped));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Shipped.can_transition_to(OutForDelivery));
        assert!(OutForDelivery.can_transition_to(Delivered));

        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(Delivered.is_terminal());
        assert!(Cancelled.is_terminal());
    }

    #[test]
    fn no_transition_leads_back_to_pending() {
        for status in OrderStatus::ALL {
            assert!(
                !status.next().contains(&OrderStatus::Pending),
                "{status} can move back to PENDING"
            );
        }
    }
}
