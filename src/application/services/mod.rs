//! Business logic services for the application layer.

pub mod repair_service;
pub mod resolver_service;

pub use repair_service::{DEFAULT_FILE_PATTERN, RepairOptions, RepairService, RepairSummary};
pub use resolver_service::{DEFAULT_MAX_HOPS, RedirectResolver};
