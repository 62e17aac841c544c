//! # molql Core Library
//!
//! Structure ingestion and query-execution runtime for molecular selection queries.
//! Selection criteria such as "all residues within 5 Å of an iron atom" are evaluated
//! by an external expression evaluator against the model built here.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Column accessors over mmCIF categories, the
//!   hierarchical `Model` (atom → residue → chain → entity) with its offset arrays, and
//!   the structure parser that builds it, including key, secondary-structure and
//!   modified-residue resolution.
//!
//! - **[`query`]: The Runtime.** Masks, atom sets, the per-query `Context` with O(1)
//!   address resolution, and the `Environment` whose scoped stacks let nested
//!   generator, filter and reduce combinators see the value of their enclosing scope.
//!
//! - **[`workflows`]: The Public API.** Loading a structure from disk with progress
//!   reporting, summarizing it, and the residue-group selection used by the CLI.

pub mod core;
pub mod query;
pub mod workflows;
