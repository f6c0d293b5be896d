//! hello-server: minimal JSON-over-HTTP service.
//!
//! This is the application entry point. It parses the command line, loads
//! configuration from TOML, initializes tracing, builds the Axum router, and
//! runs the listener until a termination signal or a server fault.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hello_server::config::{
    AppConfig, LoggingConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER,
};
use hello_server::http::{wait_for_signal, Lifecycle};
use hello_server::{create_router, AppState};

/// hello-server: health checks and an authenticated echo API
#[derive(Parser, Debug)]
#[command(name = "hello-server", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "hello_server=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

/// Initialize tracing with priority: CLI > RUST_LOG > config > default
fn init_tracing(cli_filter: Option<String>, logging: &LoggingConfig) {
    let log_filter = cli_filter
        .or_else(|| std::env::var("RUST_LOG").ok())
        .or_else(|| logging.level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry = tracing_subscriber::registry().with(EnvFilter::new(&log_filter));

    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match AppConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(args.log_level, &LoggingConfig::default());
            tracing::error!(path = %args.config, error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(args.log_level, &config.logging);
    tracing::info!(
        path = %args.config,
        http = ?config.http,
        log_format = %config.logging.format,
        "Loaded configuration"
    );

    let address = config.http.bind_address();
    let grace = Duration::from_secs(config.http.shutdown_grace_seconds);
    let state = AppState::new(config);
    let app = create_router(state);

    let mut lifecycle = Lifecycle::new(grace);
    if let Err(e) = lifecycle.init(app, &address).await {
        tracing::error!(address = %address, error = %e, "Failed to start");
        return ExitCode::FAILURE;
    }

    let reason = tokio::select! {
        reason = wait_for_signal() => reason,
        reason = lifecycle.wait_for_fault() => reason,
    };

    ExitCode::from(lifecycle.shutdown(reason).await)
}
