//! Core domain entities.
//!
//! Plain data structures describing what flows through the pipeline.
//!
//! # Entity Types
//!
//! - [`ExtractedRecord`] - One harvested record line and its URL lists
//! - [`Resolution`] - A ResolvedUrl with the [`ResolutionOutcome`] that produced it

pub mod record;
pub mod resolution;

pub use record::{ExtractedRecord, FieldSet, RecordFields, UrlEntity, UrlEntry};
pub use resolution::{Resolution, ResolutionOutcome};
