//! Typed, row-oriented access to the categories of a CIF data block.
//!
//! A data block is a set of named categories; a category is a table whose columns are
//! read by row index. Values are tri-state: present, explicitly not specified (`.`), or
//! unknown (`?`). Absent categories and columns are a normal condition and are modelled by
//! [`UndefinedColumn`], which reports no values and considers every pair of rows equal.

pub mod text;

use std::fmt;
use std::sync::Arc;

/// Presence state of a single value in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValuePresence {
    Present,
    NotSpecified,
    Unknown,
}

/// Shared handle to a column.
pub type ColumnRef = Arc<dyn Column>;

/// Typed per-row value access over one column of a category.
pub trait Column: fmt::Debug + Send + Sync {
    /// `false` for placeholder columns standing in for a missing field.
    fn is_defined(&self) -> bool;

    fn row_count(&self) -> usize;

    /// The raw string value, or `None` when the value is not present.
    fn get_string(&self, row: usize) -> Option<&str>;

    fn get_value_presence(&self, row: usize) -> ValuePresence;

    fn get_integer(&self, row: usize) -> Option<i64> {
        self.get_string(row).and_then(|s| s.trim().parse().ok())
    }

    fn get_float(&self, row: usize) -> Option<f64> {
        self.get_string(row).and_then(|s| parse_cif_float(s.trim()))
    }

    /// Compares the raw values of two rows, including their presence state.
    fn are_values_equal(&self, row_a: usize, row_b: usize) -> bool {
        self.get_value_presence(row_a) == self.get_value_presence(row_b)
            && self.get_string(row_a) == self.get_string(row_b)
    }
}

/// A table of columns sharing one row count.
pub trait Category: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn row_count(&self) -> usize;

    fn column(&self, name: &str) -> Option<ColumnRef>;
}

/// One `data_` block of a CIF file.
pub trait DataBlock: fmt::Debug + Send + Sync {
    fn header(&self) -> &str;

    /// Looks a category up by name without the leading underscore (e.g. `"atom_site"`).
    fn get_category(&self, name: &str) -> Option<Arc<dyn Category>>;
}

/// Placeholder for a column that does not exist in the source data.
#[derive(Debug, Clone, Copy, Default)]
pub struct UndefinedColumn;

impl UndefinedColumn {
    pub fn shared() -> ColumnRef {
        Arc::new(UndefinedColumn)
    }
}

impl Column for UndefinedColumn {
    fn is_defined(&self) -> bool {
        false
    }

    fn row_count(&self) -> usize {
        0
    }

    fn get_string(&self, _row: usize) -> Option<&str> {
        None
    }

    fn get_value_presence(&self, _row: usize) -> ValuePresence {
        ValuePresence::NotSpecified
    }

    fn are_values_equal(&self, _row_a: usize, _row_b: usize) -> bool {
        true
    }
}

/// Parses a CIF numeric value, ignoring a trailing standard uncertainty such as `1.234(5)`.
pub(crate) fn parse_cif_float(value: &str) -> Option<f64> {
    let number = match value.find('(') {
        Some(idx) => &value[..idx],
        None => value,
    };
    number.parse().ok()
}
