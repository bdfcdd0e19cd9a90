use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::warn;

use matchday_backend::config::AppConfig;
use matchday_backend::logging;
use matchday_backend::narrative::client::NarrativeClient;
use matchday_backend::narrative::NarrativeService;
use matchday_backend::prefs::store::PrefsStore;
use matchday_backend::provider::build_provider;
use matchday_backend::server::{self, AppState};

#[derive(Debug, Parser)]
#[command(about = "Soccer fixture aggregator backend")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config/default.toml")]
    config: PathBuf,

    /// Override the configured listen port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (mut config, secrets) = AppConfig::load(&cli.config)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    logging::init_logging(&config.logging)?;

    tracing::info!(
        provider = ?config.provider.kind,
        port = config.server.port,
        "Matchday backend starting"
    );

    let prefs = Arc::new(PrefsStore::new(&config.database.path).await?);
    let provider = build_provider(&config.provider, &secrets)?;

    let narrative = match secrets.anthropic_api_key {
        Some(ref api_key) => {
            let client = NarrativeClient::new(&config.narrative, api_key.clone())?;
            Some(Arc::new(NarrativeService::new(
                client,
                provider.clone(),
                config.narrative.clone(),
            )))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set — narrative endpoints disabled");
            None
        }
    };

    let bind = config.server.bind.clone();
    let port = config.server.port;

    let state = AppState {
        provider,
        narrative,
        prefs,
        config: Arc::new(config),
        started_at: Utc::now(),
    };

    server::serve(state, &bind, port).await
}
