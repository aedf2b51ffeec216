//! Maintenance

pub mod service;

pub use service::*;
