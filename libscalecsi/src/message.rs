//! CSI protocol messages transmitted over QUIC.
//!
//! [`CsiMessage`] is the top-level envelope for all request and response
//! variants exchanged between an orchestrator-side client and the plugin's
//! identity server via QUIC bi-directional streams.

use serde::{Deserialize, Serialize};

use crate::error::CsiError;
use crate::types::*;

/// Top-level message envelope for CSI over QUIC.
///
/// Each QUIC bi-stream carries exactly one request followed by one response.
/// The client sends a *request* variant and the server replies with the
/// corresponding *response* variant (or [`CsiMessage::Error`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CsiMessage {
    // ----- Requests --------------------------------------------------------
    /// Health probe.
    Probe,
    /// Query plugin info.
    GetPluginInfo,
    /// Query plugin capabilities.
    GetPluginCapabilities,

    // ----- Responses -------------------------------------------------------
    /// Plugin information.
    PluginInfoResponse(PluginInfo),
    /// Plugin capabilities.
    PluginCapabilitiesResponse(Vec<PluginCapability>),
    /// Probe result.  Sent for both ready and not-ready outcomes so the
    /// `ready` flag reaches the caller alongside any error.
    ProbeResult(ProbeOutcome),
    /// An error occurred.
    Error(CsiError),
}

impl CsiMessage {
    /// Whether this variant is a request a server should dispatch.
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Self::Probe | Self::GetPluginInfo | Self::GetPluginCapabilities
        )
    }
}

impl std::fmt::Display for CsiMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Probe => f.write_str("Probe"),
            Self::GetPluginInfo => f.write_str("GetPluginInfo"),
            Self::GetPluginCapabilities => f.write_str("GetPluginCapabilities"),
            Self::PluginInfoResponse(info) => {
                write!(f, "PluginInfo(name={})", info.name)
            }
            Self::PluginCapabilitiesResponse(caps) => {
                write!(f, "PluginCapabilities(count={})", caps.len())
            }
            Self::ProbeResult(outcome) => match &outcome.error {
                Some(e) => write!(f, "ProbeResult({}, {})", outcome.ready, e.code()),
                None => write!(f, "ProbeResult({})", outcome.ready),
            },
            Self::Error(e) => write!(f, "Error({})", e),
        }
    }
}
