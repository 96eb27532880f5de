//! fueldepot - Fuel Depot Entitlement Engine
//!
//! Operator entry point:
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────┐
//! │   CLI    │───▶│  Config  │───▶│    SQLite    │───▶│  Depot   │
//! │  (clap)  │    │  (YAML)  │    │ (pool+schema)│    │   ops    │
//! └──────────┘    └──────────┘    └──────────────┘    └──────────┘
//! ```
//!
//! Every subcommand is one bounded request/response against the store;
//! there are no background tasks.

use clap::Parser;

use fueldepot::cli::Cli;
use fueldepot::commands;
use fueldepot::config::AppConfig;
use fueldepot::db::Database;
use fueldepot::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.env);
    let _guard = logging::init_logging(&config);

    tracing::info!(env = %cli.env, db = %config.database.path, "fueldepot starting");

    let db = Database::connect(&config.database.path).await?;
    db.init_schema().await?;

    commands::run_command(&db, cli.command).await
}
