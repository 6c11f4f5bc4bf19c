//! Analysis configuration: parsing, validation and resolution.
//!
//! One [`AnalysisConfig`] drives every run. It enumerates:
//! - the analysis mode, which fixes the ratio columns under study;
//! - the minimum group size and Tukey fence multiplier;
//! - the ordered top-N rules matched against the input file name;
//! - the VaR slice size used by the actionable consolidation.
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! Entrypoints:
//! - Parse + validate from a TOML string: [`load_config_str`]
//! - Parse + validate from a file path: [`load_config_path`]
//! - Resolve from an explicit path, the environment, or defaults: [`resolve_config`]
//!   ([`resolve_config_with`] takes the environment lookup as a parameter)

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use instrument_loader::{Instrument, models::columns};
use serde::{Deserialize, Serialize};
use shared_utils::env::{get_env_var_opt, parse_env_value};
use tracing::debug;

/// Environment variable naming a config file when `--config` is not given.
pub const CONFIG_ENV_VAR: &str = "EV_OUTLIER_CONFIG";

/// Environment variable overriding [`AnalysisConfig::minimum_group_size`].
pub const MIN_GROUP_SIZE_ENV_VAR: &str = "EV_OUTLIER_MIN_GROUP_SIZE";

/// A numeric column analysed for outliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioColumn {
    /// Market cap over enterprise value, in percent.
    McapEv,
    /// Value-at-risk over ask price.
    VarToAsk,
}

impl RatioColumn {
    /// Column header as it appears in exports and reports.
    pub fn header(self) -> &'static str {
        match self {
            RatioColumn::McapEv => columns::MCAP_EV,
            RatioColumn::VarToAsk => columns::VAR_TO_ASK,
        }
    }

    /// Short label used inside classification notes.
    pub fn label(self) -> &'static str {
        match self {
            RatioColumn::McapEv => "MCap/EV",
            RatioColumn::VarToAsk => "VaR",
        }
    }

    pub fn value(self, instrument: &Instrument) -> Option<f64> {
        match self {
            RatioColumn::McapEv => instrument.mcap_ev_ratio,
            RatioColumn::VarToAsk => instrument.var_to_ask_ratio,
        }
    }
}

/// Which ratio columns a run analyses and how notes are composed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// MCap/EV only; notes are LOW / HIGH / within normal range.
    #[default]
    Single,
    /// MCap/EV and VaR; notes combine both flags and feed the actionable table.
    Dual,
}

impl AnalysisMode {
    pub fn ratio_columns(self) -> &'static [RatioColumn] {
        match self {
            AnalysisMode::Single => &[RatioColumn::McapEv],
            AnalysisMode::Dual => &[RatioColumn::McapEv, RatioColumn::VarToAsk],
        }
    }
}

/// Maps a file-name pattern to a top/bottom-N size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopNRule {
    /// Case-insensitive substring of the file name; doubles as the file type label.
    pub pattern: String,
    pub top_n: usize,
}

impl TopNRule {
    fn new(pattern: &str, top_n: usize) -> Self {
        Self {
            pattern: pattern.to_string(),
            top_n,
        }
    }
}

/// Parameters of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub mode: AnalysisMode,
    /// Groups smaller than this never receive bounds.
    pub minimum_group_size: usize,
    /// Tukey fence multiplier `k` in `Q1 - k*IQR` / `Q3 + k*IQR`.
    pub fence_multiplier: f64,
    /// Top/bottom-N used when no rule matches the file name.
    pub default_top_n: usize,
    /// Checked in order; the first matching pattern wins.
    pub top_n_rules: Vec<TopNRule>,
    /// Size of the top/bottom VaR slices an MCap/EV outlier must fall into to
    /// count as actionable.
    pub var_extreme_slice: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::Single,
            minimum_group_size: 5,
            fence_multiplier: 1.5,
            default_top_n: 20,
            top_n_rules: vec![
                TopNRule::new("Stocks", 50),
                TopNRule::new("CFD", 40),
                TopNRule::new("Futures", 5),
            ],
            var_extreme_slice: 100,
        }
    }
}

/// File type and top-N resolved once from the input file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileProfile {
    pub file_type: String,
    pub top_n: usize,
}

impl AnalysisConfig {
    /// Resolve the [`FileProfile`] for an input path.
    ///
    /// Only the final path component is matched, case-insensitively.
    pub fn file_profile(&self, path: impl AsRef<Path>) -> FileProfile {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| path.to_string_lossy().to_lowercase());

        self.top_n_rules
            .iter()
            .find(|rule| name.contains(&rule.pattern.to_lowercase()))
            .map(|rule| FileProfile {
                file_type: rule.pattern.clone(),
                top_n: rule.top_n,
            })
            .unwrap_or_else(|| FileProfile {
                file_type: "Unknown".to_string(),
                top_n: self.default_top_n,
            })
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.minimum_group_size == 0 {
            bail!("minimum_group_size must be at least 1");
        }
        if !self.fence_multiplier.is_finite() || self.fence_multiplier <= 0.0 {
            bail!(
                "fence_multiplier must be a positive number, got {}",
                self.fence_multiplier
            );
        }
        if let Some(rule) = self.top_n_rules.iter().find(|r| r.pattern.trim().is_empty()) {
            bail!("top_n_rules pattern cannot be empty (top_n = {})", rule.top_n);
        }
        Ok(())
    }
}

/// Parse and validate a config from a TOML string.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<AnalysisConfig> {
    let cfg: AnalysisConfig = toml::from_str(toml_str).context("failed to parse config TOML")?;
    cfg.validate().context("invalid config")?;
    Ok(cfg)
}

/// Read a config TOML file from disk, parse, and validate it.
pub fn load_config_path(path: impl AsRef<Path>) -> anyhow::Result<AnalysisConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}

/// Resolve the config for a run.
///
/// Source order: `explicit` path, then [`CONFIG_ENV_VAR`], then defaults.
/// [`MIN_GROUP_SIZE_ENV_VAR`] is applied on top of whichever source won.
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    resolve_config_with(explicit, get_env_var_opt)
}

/// [`resolve_config`] with environment variables read through `lookup`.
///
/// `lookup` returns `None` for unset or empty variables.
pub fn resolve_config_with<F>(explicit: Option<&Path>, lookup: F) -> anyhow::Result<AnalysisConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| lookup(CONFIG_ENV_VAR).map(PathBuf::from));

    let mut cfg = match path {
        Some(p) => {
            debug!(path = %p.display(), "loading analysis config");
            load_config_path(&p)?
        }
        None => AnalysisConfig::default(),
    };

    if let Some(raw) = lookup(MIN_GROUP_SIZE_ENV_VAR) {
        cfg.minimum_group_size = parse_env_value(MIN_GROUP_SIZE_ENV_VAR, &raw)?;
        cfg.validate().context("invalid config")?;
    }
    Ok(cfg)
}
