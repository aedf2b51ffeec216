//! App Context

use std::sync::Arc;

use jiff::Timestamp;
use storefront::{carts::CartLimits, checkout::CheckoutPolicy, orders::ReturnPolicy};
use thiserror::Error;
use tracing::info;

use crate::{
    database::{self, Db},
    domain::{
        carts::{CartsService, StoreCartsService},
        checkout::{CheckoutService, StoreCheckoutService},
        maintenance::{MaintenanceService, StoreMaintenanceService},
        orders::{OrdersService, StoreOrdersService},
    },
    store::{
        MemoryStore, Stores,
        demo::{self, DEMO_USER, DemoSeedError},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to run database migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),

    #[error("failed to seed demo catalog")]
    Seed(#[from] DemoSeedError),
}

/// Business rules the services are built with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Policies {
    pub checkout: CheckoutPolicy,
    pub cart_limits: CartLimits,
    pub returns: ReturnPolicy,
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn CartsService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub orders: Arc<dyn OrdersService>,
    pub maintenance: Arc<dyn MaintenanceService>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context from a database URL, applying pending
    /// migrations first.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting or migrating fails.
    pub async fn from_database_url(url: &str, policies: Policies) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrate)?;

        Ok(Self::from_stores(&Stores::postgres(&Db::new(pool)), policies))
    }

    /// Build application context over a [`MemoryStore`] seeded with the demo
    /// catalog.
    ///
    /// # Errors
    ///
    /// Returns an error when the demo catalog cannot be built.
    pub async fn in_memory(policies: Policies) -> Result<Self, AppInitError> {
        let store = MemoryStore::new();

        demo::seed(&store, Timestamp::now()).await?;

        info!(user = %DEMO_USER, "seeded in-memory demo catalog");

        Ok(Self::from_stores(&Stores::memory(&store), policies))
    }

    pub fn from_stores(stores: &Stores, policies: Policies) -> Self {
        Self {
            carts: Arc::new(StoreCartsService::new(stores.clone(), policies.cart_limits)),
            checkout: Arc::new(StoreCheckoutService::new(stores.clone(), policies.checkout)),
            orders: Arc::new(StoreOrdersService::new(stores.clone(), policies.returns)),
            maintenance: Arc::new(StoreMaintenanceService::new(stores.clone())),
        }
    }
}
