//! # Core Models Module
//!
//! In-memory representation of parsed structures.
//!
//! ## Key Components
//!
//! - [`structure`] - [`structure::Structure`] and the flat, offset-indexed [`structure::Model`]
//! - [`secondary_structure`] - Per-residue secondary-structure type, flags and element keys
//! - [`derived`] - Lazily computed, memoized views owned by a model
//!
//! ## Layout
//!
//! A model never stores nested objects. Atoms, residues, chains and entities are parallel
//! arrays; each parent level owns an offset array of length `count + 1` delimiting its
//! children, and each child level keeps a back-pointer to its parent. Moving between levels
//! is therefore a single array lookup in either direction.

pub mod derived;
pub mod secondary_structure;
pub mod structure;
