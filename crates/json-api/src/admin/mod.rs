//! Admin
//!
//! Order management for staff. Routes sit behind the admin role check and
//! are not scoped to a user.

pub(crate) mod handlers;
