//! Rankings and the actionable consolidation.

use std::cmp::Ordering;

use indexmap::{IndexMap, IndexSet};
use instrument_loader::Instrument;
use serde::Serialize;

use crate::{classify::ClassifiedInstrument, config::RatioColumn};

/// Sort order for ranking; missing values always sort last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Ascending,
    Descending,
}

fn compare(a: Option<f64>, b: Option<f64>, dir: Direction) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match dir {
            Direction::Ascending => a.total_cmp(&b),
            Direction::Descending => b.total_cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort of `rows` by `column`, truncated to `n`.
fn ranked<'a>(
    rows: &[ClassifiedInstrument<'a>],
    column: RatioColumn,
    n: usize,
    dir: Direction,
) -> Vec<ClassifiedInstrument<'a>> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| compare(column.value(a.instrument), column.value(b.instrument), dir));
    sorted.truncate(n);
    sorted
}

/// The `n` rows with the highest `column` values, ties in input order.
pub fn top_n<'a>(
    rows: &[ClassifiedInstrument<'a>],
    column: RatioColumn,
    n: usize,
) -> Vec<ClassifiedInstrument<'a>> {
    ranked(rows, column, n, Direction::Descending)
}

/// The `n` rows with the lowest `column` values, ties in input order.
pub fn bottom_n<'a>(
    rows: &[ClassifiedInstrument<'a>],
    column: RatioColumn,
    n: usize,
) -> Vec<ClassifiedInstrument<'a>> {
    ranked(rows, column, n, Direction::Ascending)
}

/// Which extreme VaR slice an MCap/EV-only outlier was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VarExtreme {
    Bottom,
    Top,
}

/// A row of the actionable table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionableOutlier<'a> {
    pub row: ClassifiedInstrument<'a>,
    /// Slice and its size; `None` for dual outliers.
    pub var_extreme: Option<(VarExtreme, usize)>,
}

impl ActionableOutlier<'_> {
    /// Note as shown in the actionable table.
    pub fn note_text(&self) -> String {
        match self.var_extreme {
            None => self.row.note.to_string(),
            Some((VarExtreme::Bottom, n)) => format!("{} in Bottom {n} VaR", self.row.note),
            Some((VarExtreme::Top, n)) => format!("{} in Top {n} VaR", self.row.note),
        }
    }
}

/// Consolidate actionable outliers from dual-mode classified rows.
///
/// Candidates, in order: dual outliers, MCap/EV-only outliers among the
/// `slice` lowest VaR values, then those among the `slice` highest. The first
/// candidate per symbol is kept and the result is sorted by MCap/EV, highest
/// first.
pub fn actionable_outliers<'a>(
    rows: &[ClassifiedInstrument<'a>],
    slice: usize,
) -> Vec<ActionableOutlier<'a>> {
    fn symbols_of(slice: Vec<ClassifiedInstrument<'_>>) -> IndexSet<String> {
        slice
            .into_iter()
            .map(|r| r.instrument.symbol.clone())
            .collect()
    }
    let bottom_var = symbols_of(bottom_n(rows, RatioColumn::VarToAsk, slice));
    let top_var = symbols_of(top_n(rows, RatioColumn::VarToAsk, slice));

    let dual = rows
        .iter()
        .filter(|r| r.note.is_dual_outlier())
        .map(|r| (r, None));
    let mcap_only = || rows.iter().filter(|r| r.note.is_mcap_ev_outlier());
    let in_bottom = mcap_only()
        .filter(|r| bottom_var.contains(&r.instrument.symbol))
        .map(|r| (r, Some((VarExtreme::Bottom, slice))));
    let in_top = mcap_only()
        .filter(|r| top_var.contains(&r.instrument.symbol))
        .map(|r| (r, Some((VarExtreme::Top, slice))));

    let mut by_symbol: IndexMap<&str, ActionableOutlier<'a>> = IndexMap::new();
    for (row, var_extreme) in dual.chain(in_bottom).chain(in_top) {
        by_symbol
            .entry(row.instrument.symbol.as_str())
            .or_insert_with(|| ActionableOutlier {
                row: row.clone(),
                var_extreme,
            });
    }

    let mut out: Vec<ActionableOutlier<'a>> = by_symbol.into_values().collect();
    out.sort_by(|a, b| {
        compare(
            a.row.instrument.mcap_ev_ratio,
            b.row.instrument.mcap_ev_ratio,
            Direction::Descending,
        )
    });
    out
}

/// Close-only instruments, one per symbol, in input order.
pub fn unactionable<'a>(close_only: impl IntoIterator<Item = &'a Instrument>) -> Vec<&'a Instrument> {
    let mut seen = IndexSet::new();
    close_only
        .into_iter()
        .filter(|&i| seen.insert(i.symbol.as_str()))
        .collect()
}
