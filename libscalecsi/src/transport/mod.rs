//! QUIC transport layer for CSI messages.
//!
//! This module provides [`CsiClient`](client::CsiClient) and
//! [`CsiServer`](server::CsiServer) that communicate [`CsiMessage`] values
//! over QUIC bi-directional streams using `quinn`.
//!
//! [`CsiMessage`]: crate::message::CsiMessage

pub mod client;
pub mod server;

/// Upper bound on a single serialized message, in either direction.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;
