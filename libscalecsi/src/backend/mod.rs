//! Storage backend implementations.
//!
//! Each backend module provides a concrete type that implements
//! [`CsiIdentity`](crate::identity::CsiIdentity).

pub mod scale;
