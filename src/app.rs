//! # Invocation Flow
//!
//! One run of the tool: validate input, query the modem, parse, select, emit.
//!
//! ```text
//! Idle ──► QuerySent ──► ResponseParsed ──► Filtered ──► Emitted
//! ```
//!
//! Input is validated before the port is opened, so a typo in `-i` never
//! touches the modem.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::at::protocol::{find_response, CMD_CSQ, CMD_QCSQ, CMD_SERVING_CELL, PREFIX_QENG};
use crate::at::AtSession;
use crate::cli::Args;
use crate::config::{Config, SignalQuery};
use crate::error::{Result, SignalInfoError};
use crate::serial::SerialPortIO;
use crate::signal::{ModemResponses, RequestedFields, SelectedFields, SignalReading};
use crate::sink::{ConsoleFormat, ConsoleSink, MetadataSink, Sink, SoracomMetadataClient, UdpSink};

/// Everything decided from the command line and config before any I/O
#[derive(Debug)]
pub struct Plan {
    pub device: String,
    pub baud_rate: u32,
    pub timeout: Duration,
    pub signal_query: SignalQuery,
    pub requested: RequestedFields,
    /// Run in order console, metadata, udp
    pub sinks: Vec<Sink>,
}

impl Plan {
    /// Resolve arguments against the configuration
    ///
    /// # Errors
    ///
    /// Input errors for bad `-i` values; [`SignalInfoError::HttpClient`] if
    /// the HTTP client for `--metadata` cannot be built.
    pub fn new(args: &Args, config: &Config) -> Result<Self> {
        let requested = RequestedFields::parse(&args.include)?;

        let mut sinks = Vec::new();
        if args.wants_console() {
            let format = if args.json { ConsoleFormat::Json } else { ConsoleFormat::Text };
            sinks.push(Sink::Console(ConsoleSink::new(format)));
        }
        if args.metadata {
            let client = SoracomMetadataClient::from_config(&config.metadata)?;
            sinks.push(Sink::Metadata(MetadataSink::new(Box::new(client))));
        }
        if args.udp_endpoint {
            sinks.push(Sink::Udp(UdpSink::new(&config.udp.endpoint)));
        }

        Ok(Self {
            device: args.device.clone().unwrap_or_else(|| config.serial.port.clone()),
            baud_rate: config.serial.baud_rate,
            timeout: Duration::from_millis(config.serial.timeout_ms),
            signal_query: config.modem.signal_query,
            requested,
            sinks,
        })
    }
}

/// Query the modem and parse everything it reports
///
/// The serving-cell query must succeed. The signal-quality query is best
/// effort: if the modem rejects it or its line is missing, the fields it would
/// have filled stay unknown.
pub async fn read_signal<P: SerialPortIO>(
    session: &mut AtSession<P>,
    signal_query: SignalQuery,
) -> Result<SignalReading> {
    let mut responses = ModemResponses::new();

    let lines = session.command(CMD_SERVING_CELL).await?;
    if find_response(&lines, PREFIX_QENG).is_none() {
        return Err(SignalInfoError::ResponseMissing {
            command: CMD_SERVING_CELL.to_string(),
            prefix: PREFIX_QENG.to_string(),
        });
    }
    responses.add_lines(&lines);

    let second = match signal_query {
        SignalQuery::Csq => Some(CMD_CSQ),
        SignalQuery::Qcsq => Some(CMD_QCSQ),
        SignalQuery::None => None,
    };
    if let Some(command) = second {
        match session.command(command).await {
            Ok(lines) => responses.add_lines(&lines),
            Err(e @ SignalInfoError::CommandRejected { .. }) => {
                warn!("{}; signal quality fields left unknown", e);
            }
            Err(e) => return Err(e),
        }
    }

    let reading = SignalReading::extract(&responses);
    debug!("Parsed {} of {} fields", reading.known_count(), reading.len());
    Ok(reading)
}

/// Run one invocation
///
/// `open_port` is only called once the plan is valid. The session, and with
/// it the port, is dropped before any sink runs.
pub async fn run<P, F>(args: &Args, config: &Config, open_port: F) -> Result<SelectedFields>
where
    P: SerialPortIO,
    F: FnOnce(&str, u32) -> Result<P>,
{
    let plan = Plan::new(args, config)?;
    debug!("Requested {} fields, {} sink(s)", plan.requested.len(), plan.sinks.len());

    let reading = {
        let port = open_port(&plan.device, plan.baud_rate)?;
        let mut session = AtSession::new(port, plan.timeout);
        read_signal(&mut session, plan.signal_query).await?
    };

    let selected = plan.requested.select(&reading);

    for sink in &plan.sinks {
        sink.emit(&selected).await?;
        debug!("Emitted to {}", sink.name());
    }

    info!("Reported {} fields from {}", selected.len(), plan.device);
    Ok(selected)
}
