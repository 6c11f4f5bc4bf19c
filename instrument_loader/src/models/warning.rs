//! Non-fatal findings collected while cleaning an export.

use std::fmt;

/// A condition the loader recovered from. Rendered verbatim in reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Some expected columns are absent; the analysis runs on what is there.
    MissingColumns(Vec<String>),
    /// The row's MCap/EV is `-inf` and the row was dropped.
    InvalidMcapEv { symbol: String },
    /// Bid or ask column missing, so no spread could be derived.
    SpreadUnavailable,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::MissingColumns(cols) => write!(
                f,
                "Warning: Some required columns are missing. Analysis might be incomplete. Missing: [{}]",
                cols.iter()
                    .map(|c| format!("'{c}'"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            LoadWarning::InvalidMcapEv { symbol } => write!(
                f,
                "WARNING: {symbol} has an invalid MCap/EV (%) value and will be excluded."
            ),
            LoadWarning::SpreadUnavailable => {
                write!(f, "Warning: BidPrice or AskPrice not found. Cannot calculate Spread %.")
            }
        }
    }
}
