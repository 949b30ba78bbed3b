//! Domain layer: the data model shared by the resolver and the pipeline.
//!
//! Has no dependencies on infrastructure. Record decoding lives here so that the
//! pipeline only deals in RawUrls and ResolvedUrls.
//!
//! - [`entities`] - Records and resolution results

pub mod entities;
