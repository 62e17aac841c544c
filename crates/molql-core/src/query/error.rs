use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Query exceeded its time budget after {elapsed:?}")]
    Timeout { elapsed: Duration },

    #[error("Evaluation failed: {0}")]
    Evaluation(String),
}
