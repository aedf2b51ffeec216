//! Storage Config

use clap::{Args, ValueEnum};

/// Where the storefront keeps its data.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Storage {
    /// `PostgreSQL`, migrated on startup.
    Postgres,

    /// Process memory, seeded with a demo catalog. Lost on restart.
    Memory,
}

/// Storage settings.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// Storage backend (postgres, memory)
    #[arg(long, env = "STORAGE", value_enum, default_value_t = Storage::Postgres)]
    pub storage: Storage,

    /// `PostgreSQL` connection string, required for the postgres backend
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}
