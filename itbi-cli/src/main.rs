use anyhow::Context;
use clap::Parser;
use tracing::debug;

use itbi_cli::{app, cli::Cli, config::AppConfig, logging};

// ─── configuration ───────────────────────────────────────────────────────────

/// Resolves the configuration file, then layers command-line flags on top.
///
/// * `--log-level` beats `[logging] level`, which beats `RUST_LOG`.
/// * `--backend` / `--db` beat the `[database]` table.
fn configure(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::discover(cli.config.as_deref())?;
    config.override_database(cli.backend.clone(), cli.db.clone());

    if let Some(level) = cli.log_level.as_deref().or(config.logging.level.as_deref()) {
        logging::set_log_level(level)?;
    }
    if let Some(file) = &config.logging.file {
        logging::enable_file_logging(file)?;
    }

    Ok(config)
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_default_logging();

    let cli = Cli::parse();
    let config = configure(&cli).context("failed to load configuration")?;
    debug!(
        backend = %config.database.backend,
        database = %config.database.connection_string,
        "configuration resolved"
    );

    let output = app::execute(cli.command, &config).await?;
    println!("{output}");

    Ok(())
}
