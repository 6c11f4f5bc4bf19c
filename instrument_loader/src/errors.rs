use std::path::PathBuf;

use thiserror::Error;

/// The unified error type for the `instrument_loader` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The input file does not exist.
    #[error("The file '{}' was not found.", .0.display())]
    FileNotFound(PathBuf),

    /// The input has no header row to map columns from.
    #[error("CSV input has no header row")]
    MissingHeader,

    /// A generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A malformed CSV record.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
