//! # Query Runtime
//!
//! The state an expression evaluator works against. A [`context::Context`] pairs a shared
//! model with the [`mask::Mask`] of atoms one query may see; [`atom_set::AtomSet`]s are the
//! immutable results; [`environment::Environment`] carries the nested iteration state of a
//! single evaluation.
//!
//! Everything here is per query. Models are shared read-only between queries, so any number
//! of contexts and environments may run concurrently over the same model on different
//! threads.

pub mod atom_set;
pub mod context;
pub mod environment;
pub mod error;
pub mod mask;
pub mod value;

pub use atom_set::{AtomSet, AtomSetSeq};
pub use context::{Context, ElementAddress, Selector};
pub use environment::{CallSite, Environment, IterationStack, Scope};
pub use error::QueryError;
pub use mask::Mask;
pub use value::Value;
