//! QUIC server that runs next to the plugin and dispatches incoming identity
//! requests to a [`CsiIdentity`] implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use quinn::crypto::rustls::QuicServerConfig;
use tracing::{debug, error, info, instrument, warn};

use crate::error::CsiError;
use crate::identity::CsiIdentity;
use crate::message::CsiMessage;
use crate::transport::MAX_MESSAGE_SIZE;

/// A CSI server that accepts QUIC connections and dispatches
/// [`CsiMessage`] requests to a [`CsiIdentity`] implementation.
pub struct CsiServer<T> {
    endpoint: quinn::Endpoint,
    handler: Arc<T>,
}

impl<T> CsiServer<T>
where
    T: CsiIdentity + 'static,
{
    /// Create a new server bound to `addr`.
    ///
    /// `tls_config` must allow TLS 1.3, which QUIC requires.
    pub fn new(
        addr: SocketAddr,
        tls_config: rustls::ServerConfig,
        handler: Arc<T>,
    ) -> Result<Self, CsiError> {
        let quic_server_config = QuicServerConfig::try_from(tls_config)
            .map_err(|e| CsiError::TransportError(format!("invalid TLS config: {e}")))?;
        let server_config = quinn::ServerConfig::with_crypto(Arc::new(quic_server_config));
        let endpoint = quinn::Endpoint::server(server_config, addr).map_err(CsiError::transport)?;
        info!(%addr, "CSI identity server listening");
        Ok(Self { endpoint, handler })
    }

    /// Accept connections in a loop until the endpoint is closed.
    ///
    /// Each accepted connection spawns a Tokio task, and each bi-stream
    /// within a connection is handled concurrently.
    pub async fn serve(&self) -> Result<(), CsiError> {
        while let Some(incoming) = self.endpoint.accept().await {
            let handler = Arc::clone(&self.handler);
            tokio::spawn(async move {
                match incoming.await {
                    Ok(conn) => {
                        let remote = conn.remote_address();
                        debug!(%remote, "CSI connection accepted");
                        if let Err(e) = Self::handle_connection(conn, handler).await {
                            warn!(%remote, error = %e, "CSI connection error");
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "CSI incoming connection failed");
                    }
                }
            });
        }
        Ok(())
    }

    /// Handle all bi-streams on a single connection.
    async fn handle_connection(conn: quinn::Connection, handler: Arc<T>) -> Result<(), CsiError> {
        loop {
            let (send, recv) = match conn.accept_bi().await {
                Ok(stream) => stream,
                Err(quinn::ConnectionError::ApplicationClosed(_))
                | Err(quinn::ConnectionError::LocallyClosed) => return Ok(()),
                Err(e) => return Err(CsiError::transport(e)),
            };

            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                if let Err(e) = Self::handle_stream(send, recv, &handler).await {
                    error!(error = %e, "CSI stream handler error");
                }
            });
        }
    }

    /// Process a single bi-stream: read request → dispatch → write response.
    #[instrument(skip_all)]
    async fn handle_stream(
        mut send: quinn::SendStream,
        mut recv: quinn::RecvStream,
        handler: &T,
    ) -> Result<(), CsiError> {
        let buf = recv
            .read_to_end(MAX_MESSAGE_SIZE)
            .await
            .map_err(CsiError::transport)?;

        let request: CsiMessage = serde_json::from_slice(&buf)
            .map_err(|e| CsiError::TransportError(format!("malformed request: {e}")))?;

        debug!(%request, "CSI request received");

        let response = dispatch(handler, request).await;
        debug!(%response, "CSI response ready");

        let payload = serde_json::to_vec(&response).map_err(CsiError::internal)?;
        send.write_all(&payload)
            .await
            .map_err(CsiError::transport)?;
        send.finish().map_err(CsiError::transport)?;
        Ok(())
    }

    /// Return a reference to the underlying QUIC endpoint, useful for
    /// obtaining the local address or shutting down.
    pub fn endpoint(&self) -> &quinn::Endpoint {
        &self.endpoint
    }

    /// Stop accepting connections and close the ones in flight.
    pub fn shutdown(&self) {
        self.endpoint
            .close(quinn::VarInt::from_u32(0), b"server shutdown");
    }
}

/// Map a [`CsiMessage`] request to the correct trait method call and wrap the
/// result in a response [`CsiMessage`].
///
/// A probe always answers with [`CsiMessage::ProbeResult`], never with
/// [`CsiMessage::Error`], so the `ready` flag survives the failure path.
pub async fn dispatch<T: CsiIdentity + ?Sized>(handler: &T, request: CsiMessage) -> CsiMessage {
    match request {
        CsiMessage::Probe => CsiMessage::ProbeResult(handler.probe().await),
        CsiMessage::GetPluginInfo => match handler.get_plugin_info().await {
            Ok(info) => CsiMessage::PluginInfoResponse(info),
            Err(e) => CsiMessage::Error(e),
        },
        CsiMessage::GetPluginCapabilities => match handler.get_plugin_capabilities().await {
            Ok(caps) => CsiMessage::PluginCapabilitiesResponse(caps),
            Err(e) => CsiMessage::Error(e),
        },

        // Response variants should never arrive as requests.
        other => {
            warn!(msg = %other, "unexpected message variant received as request");
            CsiMessage::Error(CsiError::InvalidArgument(format!(
                "unexpected message: {other}"
            )))
        }
    }
}
