//! # libscalecsi — CSI Identity service for IBM Spectrum Scale
//!
//! `libscalecsi` implements the [Container Storage Interface][csi] Identity
//! service for a plugin backed by Spectrum Scale (GPFS).  It answers the three
//! questions an orchestrator asks before any volume operation: which optional
//! services the plugin offers, whether it is ready, and what it is called.
//! Readiness is decided from the live host mount table: the plugin is ready
//! when a `gpfs` filesystem is mounted.
//!
//! Requests travel over QUIC (via [`quinn`]) as JSON envelopes.  The crate
//! follows the RK8s conventions (Tokio async runtime, `tracing` for
//! observability, `thiserror` for structured errors).
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |---|---|
//! | [`types`] | Data model: `PluginInfo`, `PluginCapability`, `ProbeOutcome`. |
//! | [`error`] | [`CsiError`] enum and its status [`Code`]s. |
//! | [`config`] | [`PluginConfig`]: plugin name and vendor version. |
//! | [`mounts`] | Mount table parsing and the [`MountSource`] seam. |
//! | [`message`] | [`CsiMessage`] protocol envelope for QUIC transport. |
//! | [`identity`] | [`CsiIdentity`] trait — plugin discovery & health. |
//! | [`transport`] | QUIC client/server built on `quinn`. |
//! | [`backend`] | The Spectrum Scale identity implementation. |
//!
//! [csi]: https://github.com/container-storage-interface/spec

pub mod backend;
pub mod config;
pub mod error;
pub mod identity;
pub mod message;
pub mod mounts;
pub mod transport;
pub mod types;

// Re-export the most commonly used items at crate root for convenience.
pub use backend::scale::ScaleIdentity;
pub use config::PluginConfig;
pub use error::{Code, CsiError};
pub use identity::CsiIdentity;
pub use message::CsiMessage;
pub use mounts::{MountEntry, MountSource, ProcMounts};
pub use types::*;
