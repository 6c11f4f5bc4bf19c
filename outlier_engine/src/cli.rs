//! Command-line front end of the `ev-outlier` binary.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, ValueEnum};
use instrument_loader::{Delimiter, LoadOptions, load_instruments};
use tracing::info;

use crate::{
    analysis::analyze,
    config::{AnalysisConfig, AnalysisMode, resolve_config},
    errors::EngineError,
    output::{render_document, write_report_file},
};

#[derive(Debug, Parser)]
#[command(
    name = "ev-outlier",
    version,
    about = "Find MCap/EV (and VaR) outliers per industry in an instrument export"
)]
pub struct Cli {
    /// Path to the CSV export to analyse
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Analysis mode; overrides the config file
    #[arg(long, value_enum)]
    pub mode: Option<AnalysisMode>,

    /// Path to an analysis config (TOML); falls back to $EV_OUTLIER_CONFIG
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// CSV field separator
    #[arg(long, value_enum, default_value = "auto")]
    pub delimiter: DelimiterArg,

    /// Minimum instruments per group; overrides config and environment
    #[arg(long)]
    pub min_group_size: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DelimiterArg {
    Auto,
    Comma,
    Semicolon,
}

impl From<DelimiterArg> for Delimiter {
    fn from(d: DelimiterArg) -> Self {
        match d {
            DelimiterArg::Auto => Delimiter::Auto,
            DelimiterArg::Comma => Delimiter::Comma,
            DelimiterArg::Semicolon => Delimiter::Semicolon,
        }
    }
}

impl Cli {
    /// Resolved config with command-line overrides applied.
    pub fn config(&self) -> anyhow::Result<AnalysisConfig> {
        self.apply_overrides(resolve_config(self.config.as_deref())?)
    }

    /// Apply `--mode` and `--min-group-size` on top of a resolved config.
    pub fn apply_overrides(&self, mut cfg: AnalysisConfig) -> anyhow::Result<AnalysisConfig> {
        if let Some(mode) = self.mode {
            cfg.mode = mode;
        }
        if let Some(min) = self.min_group_size {
            cfg.minimum_group_size = min;
        }
        cfg.validate().context("invalid command-line overrides")?;
        Ok(cfg)
    }
}

/// Load, analyse and render the full report document.
pub fn build_document(cli: &Cli) -> anyhow::Result<String> {
    let cfg = cli.config()?;
    let opts = LoadOptions {
        delimiter: cli.delimiter.into(),
    };
    let dataset = load_instruments(&cli.file, &opts).map_err(EngineError::from)?;
    let profile = cfg.file_profile(&cli.file);
    info!(file_type = %profile.file_type, top_n = profile.top_n, "file profile resolved");

    let report = analyze(&dataset, profile, &cfg);
    Ok(render_document(&cli.file, Local::now(), &report))
}

/// Run the command: print the report, or write it and print a confirmation.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let document = build_document(cli)?;
    match &cli.output {
        Some(path) => {
            write_report_file(path, &document)?;
            println!("Analysis complete. Output saved to '{}'", path.display());
        }
        None => print!("{document}"),
    }
    Ok(())
}
