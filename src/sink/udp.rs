//! SORACOM unified endpoint sink
//!
//! All selected fields go out as one compact JSON datagram. Nothing comes
//! back; a lost packet is not noticed.

use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::error::{Result, SignalInfoError};
use crate::signal::SelectedFields;

/// Sends selected fields to a UDP endpoint
#[derive(Debug, Clone)]
pub struct UdpSink {
    endpoint: String,
}

impl UdpSink {
    /// `endpoint` is `host:port`, resolved at send time
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
        }
    }

    /// Datagram payload, e.g. `{"rat":"LTE","rsrp":-95}`
    pub fn encode(fields: &SelectedFields) -> Result<Vec<u8>> {
        serde_json::to_vec(fields)
            .map_err(|e| SignalInfoError::Network(format!("Failed to encode payload: {}", e)))
    }

    async fn resolve(&self) -> Result<SocketAddr> {
        tokio::net::lookup_host(&self.endpoint)
            .await
            .map_err(|e| SignalInfoError::Network(format!("Cannot resolve {}: {}", self.endpoint, e)))?
            .next()
            .ok_or_else(|| {
                SignalInfoError::Network(format!("{} resolved to no address", self.endpoint))
            })
    }

    pub async fn emit(&self, fields: &SelectedFields) -> Result<()> {
        let payload = Self::encode(fields)?;
        let target = self.resolve().await?;

        let local: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| SignalInfoError::Network(format!("Cannot bind UDP socket: {}", e)))?;

        let sent = socket
            .send_to(&payload, target)
            .await
            .map_err(|e| SignalInfoError::Network(format!("Send to {} failed: {}", target, e)))?;
        if sent != payload.len() {
            return Err(SignalInfoError::Network(format!(
                "Short send to {}: {} of {} bytes",
                target,
                sent,
                payload.len()
            )));
        }

        debug!("UDP payload: {}", String::from_utf8_lossy(&payload));
        info!("Sent {} fields ({} bytes) to {}", fields.len(), sent, self.endpoint);
        Ok(())
    }
}
