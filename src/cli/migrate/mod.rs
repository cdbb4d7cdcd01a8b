//! Migrate command - manages the PostgreSQL schema without starting the server

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::storage::{connect_pool, Migrator, PostgresConfig, PostgresMigrator};

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration instead of applying
    #[arg(long)]
    pub revert: bool,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    // Uses the database URL whatever the configured backend is
    let pg_config = PostgresConfig::from_storage_config(&config.storage)?;
    let pool = connect_pool(&pg_config).await?;
    let migrator = PostgresMigrator::new(pool);

    if args.revert {
        migrator.revert().await?;
    } else {
        migrator.run().await?;
    }

    match migrator.version().await? {
        Some(version) => info!(version, "Schema is at migration {}", version),
        None => info!("No migrations applied"),
    }

    Ok(())
}
