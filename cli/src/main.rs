//! Device registry CLI Server
//!
//! Serves the in-memory device list on `/devices` and Prometheus metrics on
//! `/metrics`, either from two listeners (default) or from one.
//!
//! ```sh
//! # Run with default config (~/.config/device-registry/config.toml)
//! device-registry
//!
//! # Custom config path
//! device-registry --config /etc/device-registry/config.toml
//!
//! # Override ports
//! device-registry --devices-port 8080 --metrics-port 8081
//!
//! # Serve every route from the devices port
//! device-registry --single-listener
//!
//! # Validate config without starting
//! device-registry --check
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use device_registry::config::{AppConfig, ConfigError, ListenerLayout, CONFIG_ENV};
use device_registry::server::{init_tracing, ServerHandle, ServerOptions};

/// Device registry with a Prometheus metrics endpoint.
#[derive(Parser, Debug)]
#[command(
    name = "device-registry",
    version,
    about = "In-memory device registry with Prometheus metrics",
    long_about = "Serves a JSON list of devices on /devices (GET, POST) and \
                  Prometheus metrics on /metrics.\n\n\
                  Default config: ~/.config/device-registry/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Override the devices listen port.
    #[arg(long)]
    devices_port: Option<u16>,

    /// Override the metrics listen port.
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Serve /devices and /metrics from the devices listener.
    #[arg(long)]
    single_listener: bool,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(port) = self.devices_port {
            config.server.devices_port = port;
        }
        if let Some(port) = self.metrics_port {
            config.server.metrics_port = port;
        }
        if self.single_listener {
            config.server.layout = ListenerLayout::Single;
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
    }
}

/// Load the configuration file.
///
/// When serving, a missing file falls back to the defaults and the read error
/// is handed back for logging. Any other failure is fatal, and in `--check`
/// mode a missing file is fatal too.
fn resolve_config(
    path: &Path,
    check: bool,
) -> Result<(AppConfig, Option<ConfigError>), ConfigError> {
    match AppConfig::load(path) {
        Ok(config) => Ok((config, None)),
        Err(e) if !check && is_missing_file(&e) => Ok((AppConfig::default(), Some(e))),
        Err(e) => Err(e),
    }
}

fn is_missing_file(err: &ConfigError) -> bool {
    matches!(err, ConfigError::Io { source, .. } if source.kind() == ErrorKind::NotFound)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(device_registry::default_config_path);

    let resolved = resolve_config(&config_path, cli.check);
    let mut config = match &resolved {
        Ok((cfg, _)) => cfg.clone(),
        Err(_) => AppConfig::default(),
    };

    // ── Apply CLI overrides ────────────────────────────────────
    cli.apply_overrides(&mut config);

    // Init tracing first so subsequent logs are formatted properly
    init_tracing(&config);
    match resolved {
        Ok((_, None)) => info!("Configuration loaded from {}", config_path.display()),
        Ok((_, Some(e))) => {
            warn!("⚠️  {}", e);
            warn!("Using default configuration.");
        }
        Err(e) => {
            error!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    }

    if let Err(e) = config.validate() {
        error!("❌ {}", e);
        return ExitCode::FAILURE;
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("✅ Configuration is valid");
        println!("   Config file     : {}", config_path.display());
        println!("   Devices address : {}", config.server.devices_address());
        match config.server.layout {
            ListenerLayout::Split => {
                println!("   Metrics address : {}", config.server.metrics_address())
            }
            ListenerLayout::Single => println!("   Metrics address : (devices listener)"),
        }
        println!("   Seed devices    : {}", config.seed_devices().len());
        println!("   Version label   : {}", config.app.version);
        println!("   Log level       : {}", config.logging.level);
        return ExitCode::SUCCESS;
    }

    // ── Start server ───────────────────────────────────────────
    let handle = match ServerHandle::start(ServerOptions { config }).await {
        Ok(handle) => handle,
        Err(e) => {
            error!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Install OS signal handlers (SIGTERM, SIGINT)
    handle.install_signal_handler();

    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    ExitCode::SUCCESS
}
