//! # Output Sink Module
//!
//! Where selected fields end up.
//!
//! This module handles:
//! - Console output as JSON or `name: value` lines
//! - SORACOM Air metadata tags over HTTP
//! - Datagrams to the SORACOM unified endpoint

pub mod console;
pub mod metadata;
pub mod udp;

pub use console::{ConsoleFormat, ConsoleSink};
pub use metadata::{MetadataApi, MetadataSink, SoracomMetadataClient};
pub use udp::UdpSink;

use crate::error::Result;
use crate::signal::SelectedFields;

/// One output destination
#[derive(Debug)]
pub enum Sink {
    Console(ConsoleSink),
    Metadata(MetadataSink),
    Udp(UdpSink),
}

impl Sink {
    /// Deliver the fields, stopping at the first failure
    pub async fn emit(&self, fields: &SelectedFields) -> Result<()> {
        match self {
            Sink::Console(sink) => sink.emit(fields),
            Sink::Metadata(sink) => sink.emit(fields).await,
            Sink::Udp(sink) => sink.emit(fields).await,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Sink::Console(_) => "console",
            Sink::Metadata(_) => "metadata",
            Sink::Udp(_) => "udp",
        }
    }
}
