//! Server configuration module

use clap::Parser;

use crate::config::{
    db::StorageConfig, observability::LoggingConfig, policies::PolicyConfig,
    server::ServerRuntimeConfig,
};

pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod policies;
pub(crate) mod server;

/// Storefront JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "storefront-json", about = "Storefront JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Storage backend settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Checkout, cart and return rules.
    #[command(flatten)]
    pub policies: PolicyConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use storefront::orders::ReturnPolicy;
    use testresult::TestResult;

    use super::{db::Storage, *};

    #[test]
    fn defaults_match_the_storefront_rules() -> TestResult {
        let config = ServerConfig::try_parse_from(["storefront-json", "--storage", "memory"])?;

        assert!(matches!(config.storage.storage, Storage::Memory));
        assert_eq!(config.socket_addr(), "0.0.0.0:8698");

        let policies = config.policies.into_policies();
        assert_eq!(policies.checkout.tax_percent, 18);
        assert_eq!(policies.checkout.shipping_charge, 0);
        assert_eq!(policies.cart_limits.max_per_item, 10);
        assert_eq!(policies.cart_limits.max_per_cart, 50);
        assert_eq!(policies.returns, ReturnPolicy::new(7));

        Ok(())
    }

    #[test]
    fn tax_above_one_hundred_percent_is_rejected() {
        let result = ServerConfig::try_parse_from([
            "storefront-json",
            "--storage",
            "memory",
            "--tax-percent",
            "101",
        ]);

        assert!(result.is_err(), "expected a parse error, got {result:?}");
    }
}
