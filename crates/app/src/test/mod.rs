//! Test support

pub(crate) mod fixtures;
pub(crate) mod helpers;

pub(crate) use context::TestContext;
