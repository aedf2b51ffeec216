//! Cart

pub(crate) mod handlers;
pub(crate) mod models;
