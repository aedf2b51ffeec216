use clap::Args;
use jiff::Timestamp;
use storefront_app::{
    database::{self, Db},
    domain::maintenance::{MaintenanceService, StoreMaintenanceService},
    store::Stores,
};

#[derive(Debug, Args)]
pub(crate) struct ExpireOffersArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Treat this instant as now instead of the current time
    #[arg(long)]
    at: Option<Timestamp>,
}

pub(crate) async fn run(args: ExpireOffersArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = StoreMaintenanceService::new(Stores::postgres(&Db::new(pool)));

    let changed = service
        .expire_offers(args.at.unwrap_or_else(Timestamp::now))
        .await
        .map_err(|error| format!("failed to expire offers: {error}"))?;

    eprintln!("expired offers: {changed}");

    Ok(())
}
