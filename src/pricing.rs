//! Pricing
//!
//! The single source of truth for sale prices. Cart display, reconciliation,
//! checkout and order creation all call [`final_price`] with the same inputs.

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while constructing pricing inputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// Offer percentages are bounded by 100.
    #[error("offer percent must be between 0 and 100, got {0}")]
    InvalidPercent(u8),
}

/// A percentage offer with its own expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    percent: u8,
    expires_at: Option<Timestamp>,
}

impl Offer {
    /// Create an offer.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidPercent`] when `percent` exceeds 100.
    pub fn new(percent: u8, expires_at: Option<Timestamp>) -> Result<Self, PricingError> {
        if percent > 100 {
            return Err(PricingError::InvalidPercent(percent));
        }

        Ok(Self {
            percent,
            expires_at,
        })
    }

    /// An offer that never applies.
    pub const fn none() -> Self {
        Self {
            percent: 0,
            expires_at: None,
        }
    }

    /// Configured percentage, whether or not it is still valid.
    pub const fn percent(&self) -> u8 {
        self.percent
    }

    /// Configured expiry.
    pub const fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// The percentage that applies at `now`.
    ///
    /// An offer without an expiry, or whose expiry is not strictly after
    /// `now`, contributes nothing.
    pub fn active_percent(&self, now: Timestamp) -> u8 {
        match self.expires_at {
            Some(expires_at) if self.percent > 0 && expires_at > now => self.percent,
            _ => 0,
        }
    }

    /// Whether the maintenance sweep should zero this offer.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.percent > 0 && self.expires_at.is_none_or(|expires_at| expires_at <= now)
    }
}

impl Default for Offer {
    fn default() -> Self {
        Self::none()
    }
}

/// The applied percentage: the larger of the two valid offers. Offers do not stack.
pub fn applied_percent(product: &Offer, category: &Offer, now: Timestamp) -> u8 {
    product.active_percent(now).max(category.active_percent(now))
}

/// Effective sale price of `base_price` at `now`:
/// `round(base - base * percent / 100)`, halves rounded up.
pub fn final_price(base_price: u64, product: &Offer, category: &Offer, now: Timestamp) -> u64 {
    let applied = applied_percent(product, category, now);

    if applied == 0 {
        return base_price;
    }

    let base = Decimal::from(base_price);
    let price = base - base * Decimal::from(applied) / Decimal::ONE_HUNDRED;

    price
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .unwrap_or(0)
}

/// `round(amount * percent / 100)`, halves rounded up.
pub fn percent_of(amount: u64, percent: u8) -> u64 {
    let value = Decimal::from(amount) * Decimal::from(percent) / Decimal::ONE_HUNDRED;

    // percent <= 255, so the product stays well inside the 96-bit mantissa
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .unwrap_or(u64::MAX)
}

/// Offer percentage recorded against a cart line: the effective discount
/// relative to base price, rounded to the nearest whole percent.
pub fn effective_percent(base_price: u64, final_price: u64) -> u8 {
    if base_price == 0 || final_price >= base_price {
        return 0;
    }

    let saved = Decimal::from(base_price - final_price) * Decimal::ONE_HUNDRED
        / Decimal::from(base_price);

    saved
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u8()
        .unwrap_or(100)
}
