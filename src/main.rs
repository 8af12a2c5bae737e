//! # Onyx Signal Info
//!
//! Gets signal information from the SORACOM Onyx LTE USB dongle and prints
//! it, stores it as SORACOM Air metadata, or sends it to the unified endpoint.
//!
//! # Control Flow
//!
//! 1. Parse flags and load the optional TOML configuration
//! 2. Set up logging on stderr (stdout carries the result)
//! 3. Validate `-i` before the modem is touched
//! 4. Query `AT+QENG="servingcell"` plus `AT+CSQ`, release the port
//! 5. Emit to every selected sink, stopping at the first failure
//!
//! # Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | configuration or internal error |
//! | 2 | bad command line input |
//! | 3 | serial device or modem error |
//! | 4 | metadata upload or UDP send failed |
//!
//! # Examples
//!
//! ```bash
//! onyx-signal-info -d /dev/ttyUSB3 -i any --json
//! onyx-signal-info -i rat,band,rsrp,rsrq,sinr --udp-endpoint
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use onyx_signal_info::app;
use onyx_signal_info::cli::Args;
use onyx_signal_info::config::{Config, LoggingConfig};
use onyx_signal_info::error::ErrorKind;
use onyx_signal_info::serial::ModemSerial;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(ErrorKind::Config.exit_code());
        }
    };

    let _guard = init_logging(&config.logging);
    info!("onyx-signal-info v{} starting", env!("CARGO_PKG_VERSION"));

    match app::run(&args, &config, ModemSerial::open).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Load the configuration file if one was given, defaults otherwise
fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Initialize logging
///
/// `RUST_LOG` takes precedence over the configured level. The returned guard
/// flushes the file writer on drop and must be held until exit.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match &config.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path.file_name().unwrap_or(path.as_os_str());
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}
