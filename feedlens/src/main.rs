/*
feedlens - single-binary main.rs
Loads configuration and API keys, then serves the feed page with Rocket.
*/

use anyhow::Result;
use clap::Parser;
use common::{Config, Secrets};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use feedlens::server::{launch_rocket, AppState};

#[derive(Parser, Debug)]
#[command(name = "feedlens", about = "Keyword-ranked news feed with on-demand summaries")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // A local .env may carry the API keys
    if let Ok(path) = dotenv::dotenv() {
        info!(path = ?path, "loaded environment from file");
    }

    let default_path = PathBuf::from("config.default.toml");
    let override_path = match args.config {
        Some(p) if !p.exists() => {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p) => Some(p),
        None => Some(PathBuf::from("config.toml")).filter(|p| p.exists()),
    };

    let config = match Config::load_with_defaults(
        Some(&default_path).filter(|p| p.exists()).map(PathBuf::as_path),
        override_path.as_deref(),
    )
    .await
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("failed to load configuration: {:#}", e);
            return Err(e);
        }
    };
    info!(default = ?default_path, override = ?override_path, "configuration loaded");

    // Both keys are required; refuse to serve without them
    let secrets = match Secrets::from_env(&config) {
        Ok(s) => s,
        Err(e) => {
            error!("{:#}", e);
            return Err(e);
        }
    };

    let state = AppState::from_config(&config, &secrets)?;
    info!(
        llm_model = %config.llm.model,
        news_api = %config.news.api_url,
        "services initialized"
    );

    if let Err(e) = launch_rocket(state, &config.server).await {
        error!("Rocket server failed: {:#}", e);
        return Err(e);
    }

    info!("Shutdown complete");
    Ok(())
}
