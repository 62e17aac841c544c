use crate::core::config::ParseOptions;
use crate::core::models::structure::Structure;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Defines the interface for reading structure file formats into [`Structure`]s.
///
/// Implementors handle format-specific tokenizing and hand the resulting data block to
/// the structure parser.
pub trait StructureFile {
    /// The error type for I/O and parsing failures.
    type Error: Error + From<io::Error>;

    /// Reads a structure from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    /// * `options` - Controls which data block is parsed and which annotations are resolved.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is malformed or the reader fails.
    fn read_from(
        reader: &mut impl BufRead,
        options: &ParseOptions,
    ) -> Result<Structure, Self::Error>;

    /// Reads a structure from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
        options: &ParseOptions,
    ) -> Result<Structure, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, options)
    }
}
