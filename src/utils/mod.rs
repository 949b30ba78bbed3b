//! Pure helpers used across the crate.
//!
//! - [`url_normalizer`] - Domain extraction, scheme checks, `Location` joining
//! - [`placeholder`] - Placeholder / parking page predicates

pub mod placeholder;
pub mod url_normalizer;
