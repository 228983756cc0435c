//! Mount table access.
//!
//! The probe only needs one thing from the host: the list of currently
//! mounted filesystems.  [`MountSource`] is the narrow seam for that read so
//! the identity service can be exercised against synthetic tables.
//!
//! # Format
//!
//! ```text
//! <device> <mountpoint> <fstype> <options> <dump> <pass>
//! ```
//!
//! Fields are whitespace-delimited; the filesystem type is always field 2
//! (0-based).  Spaces, tabs and backslashes inside the device or mount point
//! are written as octal escapes (`\040`, `\011`, `\134`).

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default location of the host mount table.
pub const PROC_MOUNTS: &str = "/proc/mounts";

/// Environment variable overriding the mount table path.
pub const MOUNTS_PATH_ENV: &str = "SCALE_CSI_MOUNTS_PATH";

/// One parsed line of the mount table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountEntry {
    /// Mounted device or pseudo-source (`proc`, `none`, `/dev/sda1`).
    pub device: String,
    /// Where the filesystem is mounted.
    pub mount_point: String,
    /// Filesystem type, e.g. `"gpfs"`.
    pub fs_type: String,
    /// Mount options, split on `,`.
    #[serde(default)]
    pub options: Vec<String>,
    /// Dump frequency (field 4).
    #[serde(default)]
    pub dump: u32,
    /// fsck pass number (field 5).
    #[serde(default)]
    pub pass: u32,
}

impl MountEntry {
    /// Parse a single mount table line.
    ///
    /// Returns `None` for lines with fewer than three fields (blank lines,
    /// truncated pseudo-filesystem entries).  Missing or non-numeric
    /// dump/pass fields are read as `0`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let device = fields.next()?;
        let mount_point = fields.next()?;
        let fs_type = fields.next()?;

        let options = fields
            .next()
            .map(|o| o.split(',').map(str::to_owned).collect())
            .unwrap_or_default();
        let dump = fields.next().and_then(|f| f.parse().ok()).unwrap_or(0);
        let pass = fields.next().and_then(|f| f.parse().ok()).unwrap_or(0);

        Some(Self {
            device: unescape(device),
            mount_point: unescape(mount_point),
            fs_type: fs_type.to_owned(),
            options,
            dump,
            pass,
        })
    }
}

/// Parse a whole mount table, skipping lines that are too short to carry a
/// filesystem type.  Table order is preserved.
pub fn parse_mount_table(contents: &str) -> Vec<MountEntry> {
    contents.lines().filter_map(MountEntry::parse).collect()
}

/// Decode the kernel's `\ooo` octal escapes.
fn unescape(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_owned();
    }

    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
                let value = digits
                    .iter()
                    .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                if let Ok(byte) = u8::try_from(value) {
                    out.push(byte);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

// ---------------------------------------------------------------------------
// MountSource
// ---------------------------------------------------------------------------

/// Anything that can produce the current set of mounted filesystems.
///
/// Implementations must read fresh state on every call; the identity
/// service never caches entries between probes.
#[async_trait]
pub trait MountSource: Send + Sync {
    /// Read and parse the mount table.
    async fn read_mounts(&self) -> io::Result<Vec<MountEntry>>;

    /// Human-readable name of the table, used in errors and logs.
    fn describe(&self) -> String {
        "mount table".to_owned()
    }
}

/// The host mount table, read from a file (normally `/proc/mounts`).
#[derive(Debug, Clone)]
pub struct ProcMounts {
    path: PathBuf,
}

impl ProcMounts {
    /// Read the mount table from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `SCALE_CSI_MOUNTS_PATH` if set, otherwise [`PROC_MOUNTS`].
    pub fn from_env() -> Self {
        std::env::var_os(MOUNTS_PATH_ENV)
            .map(Self::new)
            .unwrap_or_default()
    }

    /// Location of the mount table file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ProcMounts {
    fn default() -> Self {
        Self::new(PROC_MOUNTS)
    }
}

#[async_trait]
impl MountSource for ProcMounts {
    async fn read_mounts(&self) -> io::Result<Vec<MountEntry>> {
        // Devices and mount points are raw bytes; only the fs type matters.
        let contents = tokio::fs::read(&self.path).await?;
        Ok(parse_mount_table(&String::from_utf8_lossy(&contents)))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A fixed, in-memory table.
#[async_trait]
impl MountSource for Vec<MountEntry> {
    async fn read_mounts(&self) -> io::Result<Vec<MountEntry>> {
        Ok(self.clone())
    }
}
