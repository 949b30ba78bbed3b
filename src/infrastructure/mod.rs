//! Infrastructure layer for external integrations.
//!
//! Concrete adapters for the seams the resolver depends on.
//!
//! # Modules
//!
//! - [`cache`] - Durable link memo (Redis, in-memory, reconnect decorator)
//! - [`network`] - HTTP hop fetcher and connectivity probe

pub mod cache;
pub mod network;
