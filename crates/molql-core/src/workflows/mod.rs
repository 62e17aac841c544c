//! # Workflows Module
//!
//! High-level entry points that tie the `core` ingestion layer and the `query` runtime
//! together.
//!
//! - **Load** ([`load`]) - Read an mmCIF file from disk and build its models, reporting
//!   each phase through [`progress::ProgressReporter`]
//! - **Summary** ([`summary`]) - Serializable per-model counts
//! - **Selection** ([`select`]) - Residue filtering driven by an
//!   [`Environment`](crate::query::Environment) iteration

pub mod load;
pub mod progress;
pub mod select;
pub mod summary;
