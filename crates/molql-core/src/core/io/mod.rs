//! Provides input/output functionality for the mmCIF exchange format.
//!
//! The parser never reads raw text directly: it goes through the typed column accessors
//! in [`cif`], which the text tokenizer implements. [`mmcif`] names the categories the
//! structure parser consumes, and [`table`] exports per-residue annotations as CSV.

pub mod cif;
pub mod mmcif;
pub mod table;
pub mod traits;
