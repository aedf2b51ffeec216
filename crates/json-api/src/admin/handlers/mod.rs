//! Admin Handlers

pub(crate) mod approve_return;
pub(crate) mod get;
pub(crate) mod reject_return;
pub(crate) mod update_status;
