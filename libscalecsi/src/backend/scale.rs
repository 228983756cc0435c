//! IBM Spectrum Scale (GPFS) identity backend.
//!
//! [`ScaleIdentity`] implements [`CsiIdentity`] for a plugin whose volumes
//! live on a GPFS filesystem.  The plugin is ready exactly when at least one
//! `gpfs` filesystem is mounted on the host.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, instrument, warn};

use crate::config::PluginConfig;
use crate::error::CsiError;
use crate::identity::CsiIdentity;
use crate::mounts::{MountSource, ProcMounts};
use crate::types::*;

/// Filesystem type that must be mounted for the plugin to be ready.
pub const GPFS_FS_TYPE: &str = "gpfs";

/// Identity service for the Spectrum Scale plugin.
///
/// Holds a shared, read-only view of the plugin configuration and the source
/// of mount table reads.  There is no other state, so a single instance can
/// serve any number of concurrent requests.
pub struct ScaleIdentity<M = ProcMounts> {
    config: Arc<PluginConfig>,
    mounts: M,
}

impl ScaleIdentity<ProcMounts> {
    /// Create an identity service that probes the host's `/proc/mounts`.
    pub fn new(config: Arc<PluginConfig>) -> Self {
        Self::with_mount_source(config, ProcMounts::default())
    }
}

impl<M: MountSource> ScaleIdentity<M> {
    /// Create an identity service that probes an arbitrary mount source.
    pub fn with_mount_source(config: Arc<PluginConfig>, mounts: M) -> Self {
        Self { config, mounts }
    }

    /// The configuration this service reports.
    pub fn config(&self) -> &PluginConfig {
        &self.config
    }
}

#[async_trait]
impl<M: MountSource> CsiIdentity for ScaleIdentity<M> {
    async fn get_plugin_info(&self) -> Result<PluginInfo, CsiError> {
        debug!("GetPluginInfo called");

        if self.config.name.is_empty() {
            return Err(CsiError::Unavailable("Driver name not configured".to_owned()));
        }

        Ok(PluginInfo {
            name: self.config.name.clone(),
            vendor_version: self.config.vendor_version.clone(),
        })
    }

    #[instrument(skip(self), fields(table = %self.mounts.describe()))]
    async fn probe(&self) -> ProbeOutcome {
        debug!("Probe called");

        let entries = match self.mounts.read_mounts().await {
            Ok(entries) => entries,
            Err(e) => {
                error!(error = %e, "probe could not read mount table");
                return ProbeOutcome::unhealthy(CsiError::FailedPrecondition(format!(
                    "Probe was unable to read {}: {e}",
                    self.mounts.describe()
                )));
            }
        };

        // Any gpfs mount will do; stop at the first one.
        if let Some(entry) = entries.iter().find(|m| m.fs_type == GPFS_FS_TYPE) {
            debug!(mount_point = %entry.mount_point, "gpfs mount found, plugin ready");
            return ProbeOutcome::healthy();
        }

        warn!(scanned = entries.len(), "no gpfs mount found, plugin not ready");
        ProbeOutcome::unhealthy(CsiError::FailedPrecondition(format!(
            "backing filesystem not mounted: {GPFS_FS_TYPE} is not listed in {}",
            self.mounts.describe()
        )))
    }

    async fn get_plugin_capabilities(&self) -> Result<Vec<PluginCapability>, CsiError> {
        Ok(vec![PluginCapability::ControllerService])
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::Path;

    use super::*;
    use crate::error::Code;
    use crate::mounts::{MountEntry, parse_mount_table};

    /// A mount source whose reads always fail.
    struct Unreadable;

    #[async_trait]
    impl MountSource for Unreadable {
        async fn read_mounts(&self) -> io::Result<Vec<MountEntry>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"))
        }
    }

    fn config(name: &str, version: &str) -> Arc<PluginConfig> {
        Arc::new(PluginConfig::new(name, version))
    }

    fn table(lines: &[&str]) -> Vec<MountEntry> {
        parse_mount_table(&lines.join("\n"))
    }

    #[tokio::test]
    async fn plugin_info_echoes_config() {
        let identity = ScaleIdentity::with_mount_source(
            config("spectrumscale.csi.ibm.com", "2.1.0"),
            Vec::<MountEntry>::new(),
        );
        let info = identity.get_plugin_info().await.unwrap();
        assert_eq!(info.name, "spectrumscale.csi.ibm.com");
        assert_eq!(info.vendor_version, "2.1.0");
    }

    #[tokio::test]
    async fn plugin_info_allows_empty_version() {
        let identity =
            ScaleIdentity::with_mount_source(config("scale", ""), Vec::<MountEntry>::new());
        let info = identity.get_plugin_info().await.unwrap();
        assert_eq!(info.vendor_version, "");
    }

    #[tokio::test]
    async fn plugin_info_requires_name() {
        let identity =
            ScaleIdentity::with_mount_source(config("", "1.0"), Vec::<MountEntry>::new());
        let err = identity.get_plugin_info().await.unwrap_err();
        assert_eq!(err.code(), Code::Unavailable);
        assert_eq!(err.to_string(), "Unavailable: Driver name not configured");
    }

    #[tokio::test]
    async fn capabilities_are_fixed() {
        let identity =
            ScaleIdentity::with_mount_source(config("", ""), Vec::<MountEntry>::new());
        let first = identity.get_plugin_capabilities().await.unwrap();
        let second = identity.get_plugin_capabilities().await.unwrap();
        assert_eq!(first, vec![PluginCapability::ControllerService]);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn probe_ready_when_gpfs_mounted() {
        let identity = ScaleIdentity::with_mount_source(
            config("scale", "1.0"),
            table(&["proc /proc proc rw 0 0", "none /gpfs-mount gpfs rw 0 0"]),
        );
        let outcome = identity.probe().await;
        assert!(outcome.ready);
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn probe_ready_regardless_of_position() {
        let lines = [
            "none /gpfs-mount gpfs rw 0 0",
            "proc /proc proc rw 0 0",
            "sysfs /sys sysfs rw 0 0",
        ];
        for rotation in 0..lines.len() {
            let mut rotated = lines.to_vec();
            rotated.rotate_left(rotation);
            let identity =
                ScaleIdentity::with_mount_source(config("scale", "1.0"), table(&rotated));
            assert_eq!(identity.probe().await, ProbeOutcome::healthy());
        }
    }

    #[tokio::test]
    async fn probe_not_ready_without_gpfs() {
        let identity = ScaleIdentity::with_mount_source(
            config("scale", "1.0"),
            table(&["proc /proc proc rw 0 0"]),
        );
        let outcome = identity.probe().await;
        assert!(!outcome.ready);
        let err = outcome.error.expect("not-ready probe carries an error");
        assert_eq!(err.code(), Code::FailedPrecondition);
        assert!(
            err.to_string()
                .starts_with("FailedPrecondition: backing filesystem not mounted")
        );
    }

    #[tokio::test]
    async fn probe_does_not_match_on_mount_point_or_device() {
        let identity = ScaleIdentity::with_mount_source(
            config("scale", "1.0"),
            table(&["gpfs /gpfs ext4 rw 0 0"]),
        );
        assert!(!identity.probe().await.ready);
    }

    #[tokio::test]
    async fn probe_unreadable_table() {
        let identity = ScaleIdentity::with_mount_source(config("scale", "1.0"), Unreadable);
        let outcome = identity.probe().await;
        assert!(!outcome.ready);
        let err = outcome.error.expect("unreadable table carries an error");
        assert_eq!(err.code(), Code::FailedPrecondition);
        assert!(err.message().contains("unable to read"));
        assert!(!err.message().contains("not mounted"));
    }

    #[tokio::test]
    async fn probe_survives_malformed_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mounts");
        std::fs::write(
            &path,
            "proc /proc proc rw 0 0\n\nnodev\nx y\nnone /gpfs-mount gpfs rw 0 0\n\n",
        )
        .unwrap();

        let identity =
            ScaleIdentity::with_mount_source(config("scale", "1.0"), ProcMounts::new(&path));
        assert_eq!(identity.probe().await, ProbeOutcome::healthy());
    }

    #[tokio::test]
    async fn ready_with_non_utf8_mount_point() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mounts");
        std::fs::write(
            &path,
            b"proc /proc proc rw 0 0\n/dev/sdb1 /mnt/caf\xE9 ext4 rw 0 0\nfs1 /gpfs/fs1 gpfs rw 0 0\n",
        )
        .unwrap();

        let identity =
            ScaleIdentity::with_mount_source(config("scale", "1.0"), ProcMounts::new(&path));
        assert_eq!(identity.probe().await, ProbeOutcome::healthy());
    }

    #[tokio::test]
    async fn probe_missing_mount_file() {
        let identity = ScaleIdentity::with_mount_source(
            config("scale", "1.0"),
            ProcMounts::new(Path::new("/nonexistent/path/for/test/mounts")),
        );
        let outcome = identity.probe().await;
        assert!(!outcome.ready);
        let err = outcome.error.unwrap();
        assert_eq!(err.code(), Code::FailedPrecondition);
        assert!(err.message().contains("/nonexistent/path/for/test/mounts"));
    }

    #[tokio::test]
    async fn probe_rereads_on_every_call() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mounts");
        std::fs::write(&path, "proc /proc proc rw 0 0\n").unwrap();

        let identity =
            ScaleIdentity::with_mount_source(config("scale", "1.0"), ProcMounts::new(&path));
        assert!(!identity.probe().await.ready);

        std::fs::write(&path, "proc /proc proc rw 0 0\nfs1 /gpfs/fs1 gpfs rw 0 0\n").unwrap();
        assert!(identity.probe().await.ready);

        std::fs::write(&path, "proc /proc proc rw 0 0\n").unwrap();
        assert!(!identity.probe().await.ready);
    }

    #[tokio::test]
    async fn shares_config_with_driver() {
        let cfg = config("scale", "1.0");
        let identity = ScaleIdentity::new(Arc::clone(&cfg));
        assert_eq!(identity.config(), cfg.as_ref());
        assert_eq!(Arc::strong_count(&cfg), 2);
    }
}
