//! # Command Line Interface
//!
//! Flags match the `get-onyx-signal-info` command line so existing cron
//! entries keep working.

use clap::Parser;
use std::path::PathBuf;

use crate::signal::DEFAULT_INCLUDE;

/// Gets signal information from the SORACOM Onyx LTE USB dongle (Quectel EG25-G)
#[derive(Parser, Debug, Clone)]
#[command(name = "onyx-signal-info", version, about, long_about = None)]
pub struct Args {
    /// AT command port to use [default: /dev/ttyUSB3, or [serial] port from the config]
    #[arg(short = 'd', long = "device", value_name = "DEVICE")]
    pub device: Option<String>,

    /// Comma-separated list of items to output; '-i any' outputs all available items
    #[arg(short = 'i', long = "include", value_name = "INCLUDE", default_value = DEFAULT_INCLUDE)]
    pub include: String,

    /// Print the result to standard output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Put the result into the SORACOM Air metadata service as tag values
    #[arg(long)]
    pub metadata: bool,

    /// Send the result to the SORACOM unified endpoint as a UDP packet
    #[arg(long = "udp-endpoint")]
    pub udp_endpoint: bool,

    /// Optional TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "PATH", env = "ONYX_SIGNAL_INFO_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Console output runs with `--json`, or when no other sink is chosen
    pub fn wants_console(&self) -> bool {
        self.json || !(self.metadata || self.udp_endpoint)
    }
}
