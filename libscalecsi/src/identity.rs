//! CSI Identity service trait.
//!
//! The Identity service allows callers to discover plugin metadata and check
//! plugin health.  Every CSI plugin must implement this service, and it is
//! the first thing an orchestrator sidecar talks to.

use async_trait::async_trait;

use crate::error::CsiError;
use crate::types::{PluginCapability, PluginInfo, ProbeOutcome};

/// Identity service — plugin discovery and health probing.
///
/// Implementations hold no mutable state; every method may be called
/// concurrently from independent requests.
#[async_trait]
pub trait CsiIdentity: Send + Sync {
    /// Return the plugin name and version.
    ///
    /// Fails with [`CsiError::Unavailable`] when the plugin has no name.
    async fn get_plugin_info(&self) -> Result<PluginInfo, CsiError>;

    /// Readiness probe.
    ///
    /// The outcome always carries the `ready` flag, and carries an error too
    /// when the plugin is not ready.
    async fn probe(&self) -> ProbeOutcome;

    /// Advertise the capabilities supported by this plugin.
    async fn get_plugin_capabilities(&self) -> Result<Vec<PluginCapability>, CsiError>;
}
