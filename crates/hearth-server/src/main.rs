//! Hearth server binary.
//!
//! Commands:
//! - `hearth serve` - Run the storefront and admin API
//! - `hearth migrate` - Apply the database schema and exit

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hearth_commerce::store::Store;
use hearth_db::Db;
use hearth_server::config::AppConfig;
use hearth_server::logging::{self, LogFormat};
use hearth_server::server;
use std::path::PathBuf;

/// Hearth - storefront and admin API for a small food brand
#[derive(Parser)]
#[command(name = "hearth")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, env = "HEARTH_CONFIG")]
    config: Option<PathBuf>,

    /// Emit JSON logs
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Override the bind address
        #[arg(long)]
        bind: Option<String>,
    },

    /// Apply the database schema
    Migrate,
}

#[actix_web::main]
async fn main() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if cli.json_logs {
        config.logging.format = LogFormat::Json;
    }
    logging::init(config.logging.format, &config.logging.filter);

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            server::run(config).await.context("server failed")?;
        }
        Commands::Migrate => {
            let db = Db::connect(&config.database.url)
                .await
                .context("failed to open database")?;
            Store::new(db).migrate().await.context("migration failed")?;
            tracing::info!(url = %config.database.url, "schema applied");
        }
    }
    Ok(())
}
