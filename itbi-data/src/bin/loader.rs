use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use itbi_data::PropertyLoader;
use itbi_db_sqlite::{SqliteRepository, sqlite_url};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Import property records from a CSV file into the register.
///
/// The CSV file must have a header row with the columns:
/// property_type, address, neighborhood, city, state, area, owner, cpf.
#[derive(Parser, Debug)]
#[command(name = "itbi-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing property records
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database path or URL (created if missing)
    #[arg(short, long, default_value = "properties.db")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();

    let args = Args::parse();
    let url = sqlite_url(&args.database);

    let repo = SqliteRepository::new(&url)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        info!("running migrations");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
    }

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = PropertyLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;
    info!(count = records.len(), file = %args.file.display(), "parsed CSV");

    let inserted = PropertyLoader::load(&repo, &records)
        .await
        .context("Failed to load properties into database")?;

    info!("Successfully imported {} properties.", inserted);

    Ok(())
}
