//! Return requests

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

/// Default number of days after delivery during which a return may be requested.
pub const DEFAULT_RETURN_WINDOW_DAYS: u16 = 7;

status_enum! {
    /// Why the customer is returning an item.
    ReturnReason {
        Defective => "DEFECTIVE",
        WrongItem => "WRONG_ITEM",
        Damaged => "DAMAGED",
        SizeIssue => "SIZE_ISSUE",
        NotAsDescribed => "NOT_AS_DESCRIBED",
        ChangedMind => "CHANGED_MIND",
        Other => "OTHER",
    }
}

impl ReturnReason {
    /// Reasons that must be backed by at least one photo.
    pub const fn requires_photo(self) -> bool {
        matches!(self, Self::Defective | Self::WrongItem | Self::Damaged)
    }
}

/// A customer's return request for one item or a whole order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    /// Why the item is coming back
    pub reason: ReturnReason,

    /// Free-text comment
    #[serde(default)]
    pub comment: Option<String>,

    /// Evidence photo URLs
    #[serde(default)]
    pub photos: Vec<String>,
}

impl ReturnRequest {
    /// A photo is attached when the reason needs one.
    pub fn has_required_evidence(&self) -> bool {
        !self.reason.requires_photo() || self.photos.iter().any(|p| !p.trim().is_empty())
    }
}

/// How long after delivery returns are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnPolicy {
    /// Days after delivery
    pub window_days: u16,
}

impl ReturnPolicy {
    /// Policy with a window of `window_days`.
    pub const fn new(window_days: u16) -> Self {
        Self { window_days }
    }

    /// The window as a duration.
    pub fn window(&self) -> SignedDuration {
        SignedDuration::from_hours(i64::from(self.window_days) * 24)
    }

    /// Whether a return requested at `now` for an item delivered at
    /// `delivered_at` is still inside the window.
    pub fn is_open(&self, delivered_at: Timestamp, now: Timestamp) -> bool {
        now.duration_since(delivered_at) <= self.window()
    }
}

impl Default for ReturnPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETURN_WINDOW_DAYS)
    }
}
