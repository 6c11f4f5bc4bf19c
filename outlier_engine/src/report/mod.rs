//! Plain-text report rendering.
//!
//! [`crate::analysis::AnalysisReport`] implements `Display`; the table
//! builders are public for callers that want individual sections.

pub mod render;
pub mod table;

pub use render::{actionable_table, instrument_table};
pub use table::{Column, TextTable};
