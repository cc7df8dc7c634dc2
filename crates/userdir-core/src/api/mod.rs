//! REST client module for the remote user directory.
//!
//! This module provides the `DirectoryClient` contract and its HTTP
//! implementation, `HttpDirectoryClient`. Each operation is a single round
//! trip; there is no retry, batching or authentication.

pub mod client;
pub mod error;

pub use client::{DirectoryClient, HttpDirectoryClient, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::TransportError;
