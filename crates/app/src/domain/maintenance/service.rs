//! Maintenance service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::store::{StoreError, Stores};

#[derive(Debug, Clone)]
pub struct StoreMaintenanceService {
    stores: Stores,
}

impl StoreMaintenanceService {
    #[must_use]
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }
}

#[async_trait]
impl MaintenanceService for StoreMaintenanceService {
    async fn expire_offers(&self, now: Timestamp) -> Result<u64, StoreError> {
        let changed = self.stores.catalog.expire_offers(now).await?;

        info!(changed, "expired offers cleared");

        Ok(changed)
    }
}

#[automock]
#[async_trait]
pub trait MaintenanceService: Send + Sync {
    /// Zero product and category offers expired at `now`. Safe to repeat;
    /// pricing ignores expired offers whether or not this has run.
    async fn expire_offers(&self, now: Timestamp) -> Result<u64, StoreError>;
}
