#![deny(missing_docs)]
//! Camsnap core library.
//!
//! Settings, allow-list checks, camera capture and the transport-agnostic
//! command handlers.

/// Allow-list checks.
pub mod access;
/// Camera capture.
pub mod capture;
/// Configuration management.
pub mod config;
/// Command handlers producing outbound replies.
pub mod dispatch;
