//! # Main — CLI Entry Point
//!
//! Loads the environment, initializes structured logging, and routes the
//! `serve` subcommand to the HTTP server.
//!
//! ## Global Options
//!
//! - `--database-url` / `DATABASE_URL`: PostgreSQL connection string.
//! - `LOG_FORMAT=json`: JSON log output for container platforms.
//! - `APP_ENV=production`: strict mode (fail-closed spam gate, tight rate
//!   limits); anything else runs permissive.

use anyhow::Result;
use clap::{Parser, Subcommand};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use leadgate::config::AppConfig;

#[derive(Parser)]
#[command(name = "leadgate", about = "Contact-form intake service")]
struct Cli {
    /// PostgreSQL connection URL (or set DATABASE_URL env var)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP intake server
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize structured logging: LOG_FORMAT=json for K8s, human-readable otherwise
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt().json().with_target(false).init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { port } => {
            let database_url = cli.database_url.as_deref().ok_or_else(|| {
                anyhow::anyhow!("DATABASE_URL is required (set via --database-url or env)")
            })?;
            let config = AppConfig::from_env();
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(leadgate::server::run(*port, database_url, config))
        }
    }
}
