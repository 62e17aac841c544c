//! # Core Module
//!
//! The foundation of molql: everything needed to turn the row-oriented `_atom_site`
//! table of an mmCIF file into the compact, hierarchically indexed [`models::structure::Model`]
//! that the query runtime traverses.
//!
//! ## Architecture
//!
//! - **File I/O** ([`io`]) - Column accessor traits, the CIF text tokenizer, the mmCIF
//!   category schema and the residue table export
//! - **Molecular Representation** ([`models`]) - Flat atom arrays with per-level offset
//!   arrays, secondary-structure annotation and lazily derived views
//! - **Ingestion** ([`parser`]) - Frame scanning, scoped key interning, secondary-structure
//!   and modified-residue resolution
//! - **Configuration** ([`config`]) - Parse options, their builder and TOML loading
//!
//! ## Invariants
//!
//! Every offset array produced by the parser is non-decreasing, has length `count + 1`,
//! starts at zero and ends at the total child count. The query runtime relies on this
//! to resolve any hierarchy level from any other in constant time.

pub mod config;
pub mod io;
pub mod models;
pub mod parser;
