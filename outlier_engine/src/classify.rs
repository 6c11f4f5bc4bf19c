//! Per-instrument outlier classification.

use std::fmt;

use instrument_loader::Instrument;
use serde::Serialize;

use crate::{
    config::{AnalysisMode, RatioColumn},
    grouping::GroupIndex,
    stats::{Bounds, BoundsTable},
};

/// Direction of a statistically significant deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Flag {
    Low,
    High,
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Flag::Low => "LOW",
            Flag::High => "HIGH",
        })
    }
}

/// Position of a value against its group's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    Low,
    High,
    WithinNormalRange,
}

impl Status {
    pub fn flag(self) -> Option<Flag> {
        match self {
            Status::Low => Some(Flag::Low),
            Status::High => Some(Flag::High),
            Status::WithinNormalRange => None,
        }
    }
}

/// Compare a value against optional bounds.
///
/// Bounds are inclusive. Without bounds or without a value nothing is flagged.
pub fn classify_value(value: Option<f64>, bounds: Option<&Bounds>) -> Status {
    match (value, bounds) {
        (Some(v), Some(b)) if v < b.lower => Status::Low,
        (Some(v), Some(b)) if v > b.upper => Status::High,
        _ => Status::WithinNormalRange,
    }
}

/// Classification note attached to every analysed instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Note {
    /// MCap/EV-only analysis.
    Single(Status),
    /// Both ratios flagged.
    DualOutlier { mcap_ev: Flag, var: Flag },
    /// Only MCap/EV flagged.
    McapEvOutlier(Flag),
    /// Nothing flagged, or only VaR.
    Unflagged,
}

impl Note {
    /// True when any ratio puts the instrument outside its bounds and the
    /// note says so.
    pub fn is_outlier(&self) -> bool {
        match self {
            Note::Single(status) => status.flag().is_some(),
            Note::DualOutlier { .. } | Note::McapEvOutlier(_) => true,
            Note::Unflagged => false,
        }
    }

    pub fn is_dual_outlier(&self) -> bool {
        matches!(self, Note::DualOutlier { .. })
    }

    pub fn is_mcap_ev_outlier(&self) -> bool {
        matches!(self, Note::McapEvOutlier(_))
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mcap = RatioColumn::McapEv.label();
        let var = RatioColumn::VarToAsk.label();
        match self {
            Note::Single(Status::Low) => f.write_str("(LOW - Statistically Significant)"),
            Note::Single(Status::High) => f.write_str("(HIGH - Statistically Significant)"),
            Note::Single(Status::WithinNormalRange) => f.write_str("(Within Normal Range)"),
            Note::DualOutlier { mcap_ev, var: v } => {
                write!(f, "Dual Outlier: {mcap} ({mcap_ev}), {var} ({v})")
            }
            Note::McapEvOutlier(flag) => write!(f, "MCap/EV Outlier: {mcap} ({flag})"),
            Note::Unflagged => Ok(()),
        }
    }
}

/// Classify one instrument against the bounds of the group that owns it.
pub fn classify(
    instrument: &Instrument,
    bounds: &BoundsTable,
    index: &GroupIndex,
    mode: AnalysisMode,
) -> Note {
    let group = index.resolve_instrument(instrument);
    let status = |column: RatioColumn| {
        classify_value(column.value(instrument), bounds.get(&group, column))
    };

    match mode {
        AnalysisMode::Single => Note::Single(status(RatioColumn::McapEv)),
        AnalysisMode::Dual => {
            match (
                status(RatioColumn::McapEv).flag(),
                status(RatioColumn::VarToAsk).flag(),
            ) {
                (Some(mcap_ev), Some(var)) => Note::DualOutlier { mcap_ev, var },
                (Some(mcap_ev), None) => Note::McapEvOutlier(mcap_ev),
                // VaR-only deviations are not surfaced on their own.
                (None, _) => Note::Unflagged,
            }
        }
    }
}

/// An instrument with its owning group and note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedInstrument<'a> {
    pub instrument: &'a Instrument,
    pub group: String,
    pub note: Note,
}

/// Classify every instrument, preserving input order.
pub fn classify_all<'a>(
    instruments: &[&'a Instrument],
    bounds: &BoundsTable,
    index: &GroupIndex,
    mode: AnalysisMode,
) -> Vec<ClassifiedInstrument<'a>> {
    instruments
        .iter()
        .map(|&instrument| ClassifiedInstrument {
            instrument,
            group: index.resolve_instrument(instrument).into_owned(),
            note: classify(instrument, bounds, index, mode),
        })
        .collect()
}
