use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spamguard::analytics::collector::StatsCollector;
use spamguard::analytics::reporter::StatsReporter;
use spamguard::api::routes::AppState;
use spamguard::api::server::ApiServer;
use spamguard::config::settings::{LoggingConfig, Settings};

/// Parse the `--config` CLI flag. Defaults to `spamguard.toml`.
fn parse_config_path() -> String {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = String::from("spamguard.toml");

    let mut i = 1;
    while i < args.len() {
        if args[i] == "--config" {
            if let Some(path) = args.get(i + 1) {
                config_path = path.clone();
            }
            i += 2;
        } else {
            i += 1;
        }
    }

    config_path
}

/// Initialise the `tracing` subscriber: stdout always, plus an append-mode
/// file layer when `logging.file` is set, in text or JSON format.
fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},spamguard=debug", config.level)));

    let log_file = config.file.as_ref().map(|path| {
        if let Some(dir) = std::path::Path::new(path).parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .expect("Failed to open log file")
    });

    if config.format == "json" {
        let registry = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stdout));
        match log_file {
            Some(file) => registry
                .with(fmt::layer().json().with_writer(file).with_ansi(false))
                .init(),
            None => registry.init(),
        }
    } else {
        let registry = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stdout).with_target(true));
        match log_file {
            Some(file) => registry
                .with(fmt::layer().with_writer(file).with_ansi(false).with_target(true))
                .init(),
            None => registry.init(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ---------------------------------------------------------------
    // 1. Configuration
    // ---------------------------------------------------------------
    let config_path = parse_config_path();
    let settings = Arc::new(Settings::load(&config_path)?);

    // ---------------------------------------------------------------
    // 2. Logging
    // ---------------------------------------------------------------
    init_tracing(&settings.logging);

    info!("Starting spamguard detection service");
    info!("Config loaded from {}", config_path);

    // ---------------------------------------------------------------
    // 3. State
    // ---------------------------------------------------------------
    let stats = Arc::new(StatsCollector::new());
    let state = AppState::new(settings.clone(), stats.clone());

    // ---------------------------------------------------------------
    // 4. Spawn the API server and stats reporter
    // ---------------------------------------------------------------
    let bind = settings.server.bind.clone();
    let api_server = ApiServer::new(state, bind.clone());
    let api_handle = tokio::spawn(async move {
        if let Err(e) = api_server.run().await {
            error!("API server error: {}", e);
        }
    });

    let reporter = StatsReporter::new(stats, &settings);
    let reporter_handle = tokio::spawn(async move {
        reporter.run().await;
    });

    info!("spamguard is running on {}. Press Ctrl+C to shut down.", bind);

    // ---------------------------------------------------------------
    // 5. Wait for shutdown signal
    // ---------------------------------------------------------------
    tokio::signal::ctrl_c().await?;
    info!("Shutting down spamguard...");

    api_handle.abort();
    reporter_handle.abort();

    info!("spamguard shut down gracefully");
    Ok(())
}
