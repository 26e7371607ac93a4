//! BOLETO — betting-slip engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the configured submission channel and serves the slip API
//! until Ctrl+C.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use boleto::api;
use boleto::channel::dry_run::DryRunChannel;
use boleto::channel::http::HttpChannel;
use boleto::channel::SubmissionChannel;
use boleto::config::AppConfig;
use boleto::engine::session::SlipSession;

const BANNER: &str = r#"
 ____   ___  _     _____ _____ ___
| __ ) / _ \| |   | ____|_   _/ _ \
|  _ \| | | | |   |  _|   | || | | |
| |_) | |_| | |___| |___  | || |_| |
|____/ \___/|_____|_____| |_| \___/

  Betting-slip engine v0.1.0
"#;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("BOLETO_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config_found = Path::new(&config_path).exists();
    let cfg = if config_found {
        AppConfig::load(&config_path)?
    } else {
        AppConfig::default()
    };

    init_logging();

    println!("{BANNER}");
    if !config_found {
        warn!(path = %config_path, "Config file not found, using defaults");
    }

    // -- Submission channel ----------------------------------------------

    let channel: Arc<dyn SubmissionChannel> = if cfg.submission.dry_run {
        info!("Dry-run mode: batches are logged, not sent");
        Arc::new(DryRunChannel::new())
    } else {
        let http = HttpChannel::from_config(&cfg.submission)?;
        info!(url = %http.batch_url(), "Submitting batches to wagering API");
        Arc::new(http)
    };

    let session = Arc::new(SlipSession::new(channel, &cfg.slip));
    info!(
        channel = session.channel_name(),
        default_stake = %cfg.slip.default_stake,
        max_selections = cfg.slip.max_selections,
        "BOLETO starting up"
    );

    if !cfg.server.enabled {
        warn!("Slip API disabled in config, nothing to serve");
        return Ok(());
    }

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received.");
    };

    api::serve(session.clone(), cfg.server.port, shutdown).await?;

    let summary = session.summary().await;
    if summary.selection_count > 0 {
        info!(%summary, "Discarding unsubmitted slip");
    }
    info!("BOLETO shut down cleanly.");

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("boleto=info"));

    let json_logging = std::env::var("BOLETO_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
