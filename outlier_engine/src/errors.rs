use std::path::PathBuf;

use thiserror::Error;

/// The unified error type for the `outlier_engine` crate.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Loading or cleaning the input export failed.
    #[error(transparent)]
    Load(#[from] instrument_loader::Error),

    /// The rendered report could not be written.
    #[error("failed to write report to '{}'", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    /// True when the input file does not exist.
    pub fn is_file_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::Load(instrument_loader::Error::FileNotFound(_))
        )
    }
}
