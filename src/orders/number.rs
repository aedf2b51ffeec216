//! Human-readable order numbers: `ORD-YYYYMMDD-XXXXXX`.

use std::fmt::{self, Display};

use jiff::Timestamp;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const PREFIX: &str = "ORD";
const RANDOM_BYTES: usize = 3;

/// A string that is not an order number.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid order number: {0}")]
pub struct InvalidOrderNumber(pub String);

/// Order number. Unique across all orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generate a number for an order placed at `now` using the thread-local RNG.
    pub fn generate(now: Timestamp) -> Self {
        Self::generate_with(&mut rand::thread_rng(), now)
    }

    /// Generate a number from `rng`. The date part is the UTC calendar day of `now`.
    pub fn generate_with<R: RngCore + ?Sized>(rng: &mut R, now: Timestamp) -> Self {
        let mut bytes = [0_u8; RANDOM_BYTES];
        rng.fill_bytes(&mut bytes);

        let suffix: String = bytes.iter().map(|b| format!("{b:02X}")).collect();

        Self(format!("{PREFIX}-{}-{suffix}", now.strftime("%Y%m%d")))
    }

    /// Validate the shape of an order number.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidOrderNumber`] when `value` is not `ORD-` followed by
    /// eight digits, a dash and six uppercase hex characters.
    pub fn parse(value: &str) -> Result<Self, InvalidOrderNumber> {
        let invalid = || InvalidOrderNumber(value.to_string());

        let mut parts = value.split('-');

        let (Some(prefix), Some(date), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let date_ok = date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit());
        let suffix_ok = suffix.len() == RANDOM_BYTES * 2
            && suffix
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b));

        if prefix != PREFIX || !date_ok || !suffix_ok {
            return Err(invalid());
        }

        Ok(Self(value.to_string()))
    }

    /// The number as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = InvalidOrderNumber;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(value: OrderNumber) -> Self {
        value.0
    }
}

impl std::str::FromStr for OrderNumber {
    type Err = InvalidOrderNumber;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}
