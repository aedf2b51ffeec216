//! Caller identity
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! user in `x-user-uuid` and marks administrators with `x-user-role: admin`.

pub(crate) mod middleware;

pub(crate) const USER_UUID_HEADER: &str = "x-user-uuid";
pub(crate) const USER_ROLE_HEADER: &str = "x-user-role";
