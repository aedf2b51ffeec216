use clap::{Parser, Subcommand};

mod expire_offers;
mod migrate;

#[derive(Debug, Parser)]
#[command(name = "storefront-app", about = "Storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate(migrate::MigrateArgs),

    /// Zero every product and category offer past its expiry
    ExpireOffers(expire_offers::ExpireOffersArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Migrate(args) => migrate::run(args).await,
            Commands::ExpireOffers(args) => expire_offers::run(args).await,
        }
    }
}
