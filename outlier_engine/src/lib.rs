//! Grouped outlier analysis for instrument exports.
//!
//! The pipeline, leaf first:
//! - [`grouping`] partitions tradable instruments into industry groups, sector
//!   aggregates and a miscellaneous catch-all;
//! - [`stats`] computes Tukey fences per group and ratio column;
//! - [`classify`] labels every instrument against its owning group;
//! - [`rank`] builds top/bottom slices and the actionable consolidation;
//! - [`analysis`] ties them together into an [`analysis::AnalysisReport`],
//!   which [`report`] renders as text.

pub mod analysis;
pub mod classify;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod grouping;
pub mod output;
pub mod rank;
pub mod report;
pub mod stats;

pub use analysis::{AnalysisReport, analyze};
pub use config::{AnalysisConfig, AnalysisMode, FileProfile, RatioColumn};
pub use errors::EngineError;
