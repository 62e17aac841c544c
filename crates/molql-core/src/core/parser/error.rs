use crate::core::io::cif::text::CifError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid CIF syntax: {0}")]
    Syntax(#[from] CifError),

    #[error("No data block found")]
    MissingDataBlock,

    #[error("Data block '{0}' not found")]
    UnknownDataBlock(String),

    #[error("Malformed structure data: {0}")]
    Format(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
