//! QUIC client used by the orchestrator side to query a plugin's identity
//! service.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use quinn::crypto::rustls::QuicClientConfig;
use tracing::{debug, instrument};

use crate::error::CsiError;
use crate::message::CsiMessage;
use crate::transport::MAX_MESSAGE_SIZE;
use crate::types::{PluginCapability, PluginInfo, ProbeOutcome};

/// A lightweight CSI client that sends [`CsiMessage`] requests over a single
/// QUIC connection and returns the server's response.
pub struct CsiClient {
    endpoint: quinn::Endpoint,
    connection: quinn::Connection,
}

impl CsiClient {
    /// Establish a new QUIC connection to the CSI server at `addr`.
    ///
    /// * `addr` — socket address of the remote CSI server
    /// * `server_name` — TLS SNI name that must match a SAN in the server's
    ///   certificate
    /// * `tls_config` — client TLS configuration trusting the server's issuer
    pub async fn connect(
        addr: SocketAddr,
        server_name: &str,
        tls_config: rustls::ClientConfig,
    ) -> Result<Self, CsiError> {
        let quic_client_config = QuicClientConfig::try_from(tls_config)
            .map_err(|e| CsiError::TransportError(format!("invalid TLS config: {e}")))?;
        let client_config = quinn::ClientConfig::new(Arc::new(quic_client_config));

        let bind: SocketAddr = if addr.is_ipv6() {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        };
        let mut endpoint = quinn::Endpoint::client(bind).map_err(CsiError::transport)?;
        endpoint.set_default_client_config(client_config);

        let connection = endpoint
            .connect(addr, server_name)
            .map_err(CsiError::transport)?
            .await
            .map_err(CsiError::transport)?;

        debug!(%addr, %server_name, "CSI QUIC connection established");
        Ok(Self {
            endpoint,
            connection,
        })
    }

    /// Send a request and wait for the corresponding response.
    ///
    /// Each call opens a new bi-directional QUIC stream, writes the
    /// JSON-serialized request, finishes the send side, then reads the
    /// full response and deserializes it.
    #[instrument(skip(self), fields(msg = %msg))]
    pub async fn request(&self, msg: &CsiMessage) -> Result<CsiMessage, CsiError> {
        let (mut send, mut recv) = self
            .connection
            .open_bi()
            .await
            .map_err(CsiError::transport)?;

        let payload = serde_json::to_vec(msg).map_err(CsiError::internal)?;
        send.write_all(&payload)
            .await
            .map_err(CsiError::transport)?;
        send.finish().map_err(CsiError::transport)?;

        let buf = recv
            .read_to_end(MAX_MESSAGE_SIZE)
            .await
            .map_err(CsiError::transport)?;

        let response: CsiMessage = serde_json::from_slice(&buf).map_err(CsiError::transport)?;
        debug!(%response, "CSI response received");
        Ok(response)
    }

    /// Query the plugin's advertised capabilities.
    pub async fn get_plugin_capabilities(&self) -> Result<Vec<PluginCapability>, CsiError> {
        match self.request(&CsiMessage::GetPluginCapabilities).await? {
            CsiMessage::PluginCapabilitiesResponse(caps) => Ok(caps),
            other => Err(unexpected(other)),
        }
    }

    /// Query the plugin's name and vendor version.
    pub async fn get_plugin_info(&self) -> Result<PluginInfo, CsiError> {
        match self.request(&CsiMessage::GetPluginInfo).await? {
            CsiMessage::PluginInfoResponse(info) => Ok(info),
            other => Err(unexpected(other)),
        }
    }

    /// Probe the plugin.
    ///
    /// The outer `Result` reports transport failures only.  A plugin that
    /// answers "not ready" yields `Ok` with the error inside the outcome.
    pub async fn probe(&self) -> Result<ProbeOutcome, CsiError> {
        match self.request(&CsiMessage::Probe).await? {
            CsiMessage::ProbeResult(outcome) => Ok(outcome),
            other => Err(unexpected(other)),
        }
    }

    /// Close the underlying QUIC connection gracefully.
    pub async fn close(&self) {
        self.connection
            .close(quinn::VarInt::from_u32(0), b"client shutdown");
        self.endpoint.wait_idle().await;
    }
}

/// Turn a response of the wrong kind into an error, passing server-side
/// errors through untouched.
fn unexpected(response: CsiMessage) -> CsiError {
    match response {
        CsiMessage::Error(e) => e,
        other => CsiError::Internal(format!("unexpected response: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_passes_server_errors_through() {
        let err = CsiError::Unavailable("Driver name not configured".into());
        assert_eq!(unexpected(CsiMessage::Error(err.clone())), err);
    }

    #[test]
    fn unexpected_wraps_wrong_variant() {
        let err = unexpected(CsiMessage::ProbeResult(ProbeOutcome::healthy()));
        assert!(matches!(err, CsiError::Internal(_)));
        assert!(err.message().contains("ProbeResult(true)"));
    }
}
