//! CSI error types.
//!
//! All errors in the `libscalecsi` crate are represented by the [`CsiError`]
//! enum, which derives [`thiserror::Error`] for ergonomic error handling and
//! also implements [`Serialize`]/[`Deserialize`] so errors can travel across
//! the QUIC transport layer.
//!
//! Every variant maps onto a gRPC-style status [`Code`], which is what
//! orchestrator sidecars key their retry decisions on.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status codes surfaced to callers.
///
/// Numbering follows the [gRPC status codes specification](https://github.com/grpc/grpc/blob/master/doc/statuscodes.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Code {
    /// Client specified an invalid argument.
    InvalidArgument = 3,
    /// The system is not in a state required for the operation's execution.
    FailedPrecondition = 9,
    /// Internal error.
    Internal = 13,
    /// The service is currently unavailable.
    Unavailable = 14,
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Code::InvalidArgument => "InvalidArgument",
            Code::FailedPrecondition => "FailedPrecondition",
            Code::Internal => "Internal",
            Code::Unavailable => "Unavailable",
        };
        f.write_str(name)
    }
}

/// Unified error type for CSI operations.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum CsiError {
    /// The host is not in a state where the plugin can serve: the mount
    /// table is unreadable or the backing filesystem is absent.
    #[error("FailedPrecondition: {0}")]
    FailedPrecondition(String),

    /// The plugin was not configured before serving requests.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// The caller supplied an invalid argument.
    #[error("InvalidArgument: {0}")]
    InvalidArgument(String),

    /// A QUIC / transport-level error.
    #[error("Unavailable: transport error: {0}")]
    TransportError(String),

    /// An unclassified internal error.
    #[error("Internal: {0}")]
    Internal(String),
}

impl CsiError {
    /// The status code reported to the caller for this error.
    pub fn code(&self) -> Code {
        match self {
            Self::FailedPrecondition(_) => Code::FailedPrecondition,
            Self::Unavailable(_) | Self::TransportError(_) => Code::Unavailable,
            Self::InvalidArgument(_) => Code::InvalidArgument,
            Self::Internal(_) => Code::Internal,
        }
    }

    /// The bare message, without the status code prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::FailedPrecondition(m)
            | Self::Unavailable(m)
            | Self::InvalidArgument(m)
            | Self::TransportError(m)
            | Self::Internal(m) => m,
        }
    }

    /// Create a [`CsiError::TransportError`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn transport<E: fmt::Display>(e: E) -> Self {
        Self::TransportError(e.to_string())
    }

    /// Create a [`CsiError::Internal`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn internal<E: fmt::Display>(e: E) -> Self {
        Self::Internal(e.to_string())
    }
}
