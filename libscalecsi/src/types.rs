//! Core CSI identity types: plugin info, capabilities, and probe outcomes.
//!
//! These types form the data model shared by the [`CsiIdentity`] trait, the
//! transport layer, and the Spectrum Scale backend.  They are all
//! [`Serialize`]/[`Deserialize`] so they can be transmitted over QUIC as JSON.
//!
//! [`CsiIdentity`]: crate::identity::CsiIdentity

use serde::{Deserialize, Serialize};

use crate::error::CsiError;

// ---------------------------------------------------------------------------
// Plugin info & capabilities
// ---------------------------------------------------------------------------

/// Information about the CSI plugin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PluginInfo {
    /// Plugin name, e.g. `"spectrumscale.csi.ibm.com"`.
    pub name: String,
    /// Vendor-provided version string.
    pub vendor_version: String,
}

/// Capabilities advertised by the CSI plugin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PluginCapability {
    /// Plugin provides a Controller service.
    ControllerService,
}

// ---------------------------------------------------------------------------
// Probe
// ---------------------------------------------------------------------------

/// Result of a readiness probe.
///
/// Unlike the other identity calls, a probe reports two signals at once: the
/// `ready` flag and, when not ready, the error explaining why.  Both travel
/// to the caller together; some sidecars read `ready` even when `error` is
/// set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Whether the plugin is ready to serve requests.
    pub ready: bool,
    /// Why the plugin is not ready.
    #[serde(default)]
    pub error: Option<CsiError>,
}

impl ProbeOutcome {
    /// A successful probe: ready, no error.
    pub fn healthy() -> Self {
        Self {
            ready: true,
            error: None,
        }
    }

    /// A failed probe: not ready, with the reason attached.
    pub fn unhealthy(error: CsiError) -> Self {
        Self {
            ready: false,
            error: Some(error),
        }
    }

    /// Collapse the outcome into a plain result, dropping the payload on the
    /// error path.
    pub fn into_result(self) -> Result<bool, CsiError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.ready),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_outcome_constructors() {
        let ok = ProbeOutcome::healthy();
        assert!(ok.ready);
        assert!(ok.error.is_none());

        let bad = ProbeOutcome::unhealthy(CsiError::FailedPrecondition("down".into()));
        assert!(!bad.ready);
        assert_eq!(
            bad.into_result(),
            Err(CsiError::FailedPrecondition("down".into()))
        );
    }

    #[test]
    fn probe_outcome_keeps_payload_on_the_wire() {
        let outcome = ProbeOutcome::unhealthy(CsiError::FailedPrecondition("down".into()));
        let json = serde_json::to_value(&outcome).expect("serialize");
        assert_eq!(json["ready"], serde_json::Value::Bool(false));
        assert!(json["error"].is_object());

        let de: ProbeOutcome = serde_json::from_value(json).expect("deserialize");
        assert_eq!(de, outcome);
    }

    #[test]
    fn probe_outcome_error_defaults_to_none() {
        let de: ProbeOutcome = serde_json::from_str(r#"{"ready":true}"#).expect("deserialize");
        assert_eq!(de, ProbeOutcome::healthy());
    }
}
