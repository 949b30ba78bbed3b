//! Application layer services implementing the repair workflow.
//!
//! Services consume the cache and network traits from
//! [`crate::infrastructure`] and never touch Redis or HTTP clients directly.
//!
//! # Available Services
//!
//! - [`services::resolver_service::RedirectResolver`] - Memoized redirect-chain resolution
//! - [`services::repair_service::RepairService`] - Directory-level record repair

pub mod services;
