//! Plugin identity configuration.
//!
//! The driver context builds one [`PluginConfig`] at startup and hands an
//! `Arc` of it to the identity service.  It is never mutated afterwards.
//!
//! Environment variables read by [`PluginConfig::from_env`]:
//! - `SCALE_CSI_DRIVER_NAME`: plugin name reported by `GetPluginInfo`.
//!   Defaults to empty, which makes `GetPluginInfo` fail with `Unavailable`.
//! - `SCALE_CSI_VENDOR_VERSION`: vendor version string.
//!   Defaults to the crate version.

use serde::{Deserialize, Serialize};

/// Environment variable holding the plugin name.
pub const DRIVER_NAME_ENV: &str = "SCALE_CSI_DRIVER_NAME";

/// Environment variable holding the vendor version.
pub const VENDOR_VERSION_ENV: &str = "SCALE_CSI_VENDOR_VERSION";

/// Static identity of the plugin.
///
/// The name is not validated here: configuration loading and service
/// start-up may happen in either order, so emptiness is checked when
/// `GetPluginInfo` is served.  A missing vendor version defaults to the crate
/// version, whether the config comes from the environment or from serde.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PluginConfig {
    /// Plugin name, e.g. `"spectrumscale.csi.ibm.com"`.
    #[serde(default)]
    pub name: String,
    /// Vendor version.  An explicitly empty string is reported as-is.
    #[serde(default = "default_vendor_version")]
    pub vendor_version: String,
}

fn default_vendor_version() -> String {
    env!("CARGO_PKG_VERSION").to_owned()
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            vendor_version: default_vendor_version(),
        }
    }
}

impl PluginConfig {
    /// Build a configuration from explicit values.
    pub fn new(name: impl Into<String>, vendor_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vendor_version: vendor_version.into(),
        }
    }

    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            name: lookup(DRIVER_NAME_ENV).unwrap_or_default(),
            vendor_version: lookup(VENDOR_VERSION_ENV).unwrap_or_else(default_vendor_version),
        }
    }
}
