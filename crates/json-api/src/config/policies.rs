//! Business rule knobs

use clap::Args;
use storefront::{carts::CartLimits, checkout::CheckoutPolicy, orders::ReturnPolicy};
use storefront_app::context::Policies;

/// Checkout, cart and return rules.
#[derive(Debug, Clone, Copy, Args)]
pub struct PolicyConfig {
    /// Tax charged on the order subtotal, in percent
    #[arg(
        long,
        env = "TAX_PERCENT",
        default_value_t = 18,
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    pub tax_percent: u8,

    /// Flat shipping charge per order, in rupees
    #[arg(long, env = "SHIPPING_CHARGE", default_value_t = 0)]
    pub shipping_charge: u64,

    /// Largest quantity of one size in a cart
    #[arg(long, env = "MAX_QUANTITY_PER_ITEM", default_value_t = 10)]
    pub max_quantity_per_item: u32,

    /// Largest total quantity in a cart
    #[arg(long, env = "MAX_CART_QUANTITY", default_value_t = 50)]
    pub max_cart_quantity: u32,

    /// Days after delivery during which returns are accepted
    #[arg(long, env = "RETURN_WINDOW_DAYS", default_value_t = 7)]
    pub return_window_days: u16,
}

impl PolicyConfig {
    pub(crate) fn into_policies(self) -> Policies {
        Policies {
            checkout: CheckoutPolicy {
                tax_percent: self.tax_percent,
                shipping_charge: self.shipping_charge,
            },
            cart_limits: CartLimits {
                max_per_item: self.max_quantity_per_item,
                max_per_cart: self.max_cart_quantity,
            },
            returns: ReturnPolicy::new(self.return_window_days),
        }
    }
}
