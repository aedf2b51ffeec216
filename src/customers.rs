//! Customers
//!
//! Shapes supplied by the identity and address providers.

use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// Address UUID
pub type AddressUuid = TypedUuid<Address>;

/// A user as known to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User UUID
    pub uuid: UserUuid,

    /// Display name
    pub name: String,

    /// Contact email
    pub email: String,
}

/// A saved shipping address, scoped to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Address UUID
    pub uuid: AddressUuid,

    /// Owning user
    pub user_uuid: UserUuid,

    /// Recipient name
    pub full_name: String,

    /// Recipient phone
    pub phone: String,

    /// Street and house number
    pub street_address: String,

    /// City
    pub city: String,

    /// State
    pub state: String,

    /// Postal code
    pub pincode: String,

    /// Country
    pub country: String,

    /// Soft-deleted
    pub is_deleted: bool,
}

impl Address {
    /// Whether `user` may ship to this address.
    pub fn is_usable_by(&self, user: UserUuid) -> bool {
        self.user_uuid == user && !self.is_deleted
    }
}
