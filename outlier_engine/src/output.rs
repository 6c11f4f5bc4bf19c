//! Report documents and file output.

use std::{fmt::Display, fs, path::Path};

use chrono::{DateTime, Local};
use tracing::info;

use crate::errors::EngineError;

/// Prefix a rendered report with its source file and generation time.
pub fn render_document(
    source: impl AsRef<Path>,
    generated_at: DateTime<Local>,
    report: &impl Display,
) -> String {
    format!(
        "Analysis results for {}\nReport generated on: {}\n\n{report}",
        source.as_ref().display(),
        generated_at.format("%Y-%m-%d %H:%M:%S%.6f"),
    )
}

/// Write a finished document, replacing any existing file.
pub fn write_report_file(path: impl AsRef<Path>, document: &str) -> Result<(), EngineError> {
    let path = path.as_ref();
    fs::write(path, document).map_err(|source| EngineError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = document.len(), "report written");
    Ok(())
}
