//! Text rendering of an [`AnalysisReport`].

use std::fmt;

use crate::{
    analysis::{AnalysisReport, GroupReport},
    classify::ClassifiedInstrument,
    config::RatioColumn,
    rank::ActionableOutlier,
    report::table::{Column, TextTable, banner, decimal2, decimal4, percent, plain},
    stats::{Bounds, Quartiles},
};

const INSTRUMENT_COLUMNS: [Column; 7] = [
    Column::new("Symbol", 10),
    Column::new("Industry", 40),
    Column::new("MCap/EV (%)", 15),
    Column::new("Ask Price", 0),
    Column::new("Spread %", 0),
    Column::new("VaR/Ask Ratio", 15),
    Column::new("Note", 4),
];

const ACTIONABLE_COLUMNS: [Column; 5] = [
    Column::new("Symbol", 10),
    Column::new("Industry", 40),
    Column::new("MCap/EV (%)", 15),
    Column::new("VaR/Ask Ratio", 15),
    Column::new("Note", 4),
];

/// Table of classified instruments with prices, spread and note.
pub fn instrument_table<'r, 'a: 'r>(
    title: impl Into<String>,
    rows: impl IntoIterator<Item = &'r ClassifiedInstrument<'a>>,
) -> TextTable {
    let mut table = TextTable::new(title, &INSTRUMENT_COLUMNS);
    for row in rows {
        let i = row.instrument;
        table.push_row(vec![
            i.symbol.clone(),
            i.industry.clone(),
            percent(i.mcap_ev_ratio),
            decimal2(i.ask_price),
            percent(i.spread_percent),
            plain(i.var_to_ask_ratio),
            row.note.to_string(),
        ]);
    }
    table
}

/// The dual-mode actionable table.
pub fn actionable_table(rows: &[ActionableOutlier<'_>]) -> TextTable {
    let mut table = TextTable::new("Actionable Outliers", &ACTIONABLE_COLUMNS);
    for a in rows {
        let i = a.row.instrument;
        table.push_row(vec![
            i.symbol.clone(),
            i.industry.clone(),
            percent(i.mcap_ev_ratio),
            decimal4(i.var_to_ask_ratio),
            a.note_text(),
        ]);
    }
    table
}

fn write_quartiles(f: &mut fmt::Formatter<'_>, q: &Quartiles, b: &Bounds) -> fmt::Result {
    writeln!(f, "Q1 (25th percentile): {:.4}", q.q1)?;
    writeln!(f, "Q3 (75th percentile): {:.4}", q.q3)?;
    writeln!(f, "IQR (Interquartile Range): {:.4}", q.iqr)?;
    writeln!(f, "Lower Outlier Bound: {:.4}", b.lower)?;
    writeln!(f, "Upper Outlier Bound: {:.4}", b.upper)
}

fn write_group(f: &mut fmt::Formatter<'_>, g: &GroupReport<'_>) -> fmt::Result {
    let header = g.column.header();
    writeln!(f)?;
    writeln!(f, "{}", banner(&format!("Analysis for: {}", g.name.to_uppercase()), 30))?;
    writeln!(f, "Contains {} total instruments.", g.size)?;
    writeln!(f)?;
    writeln!(f, "--- {header} Ratio Statistics ---")?;
    write_quartiles(f, &g.stats.quartiles, &g.stats.bounds)?;
    writeln!(
        f,
        "--- Found {} Total Statistical {header} Outliers ---",
        g.outliers.len()
    )?;
    write!(
        f,
        "{}",
        instrument_table(format!("Statistical {header} Outliers"), &g.outliers)
    )
}

impl fmt::Display for AnalysisReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Detected file type: {}. Displaying top/bottom {} assets at end.",
            self.profile.file_type, self.profile.top_n
        )?;
        for w in self.warnings {
            writeln!(f, "{w}")?;
        }

        for g in &self.group_reports {
            write_group(f, g)?;
        }

        if let Some(n) = self.undersized_miscellaneous {
            writeln!(f)?;
            writeln!(
                f,
                "NOTE: A miscellaneous group of {n} instruments was formed but was too small \
                 to analyze (minimum size: {}).",
                self.minimum_group_size
            )?;
        }

        for g in &self.global {
            writeln!(f)?;
            writeln!(
                f,
                "{}",
                banner(&format!("Global {} Ratio Statistics", g.column.header()), 25)
            )?;
            match (&g.quartiles, &g.bounds) {
                (Some(q), Some(b)) => write_quartiles(f, q, b)?,
                _ => writeln!(f, "No data available.")?,
            }
        }

        let mcap = RatioColumn::McapEv.header();
        let n = self.profile.top_n;
        write!(
            f,
            "{}",
            instrument_table(format!("Top {n} Highest {mcap} Assets"), &self.top)
        )?;
        write!(
            f,
            "{}",
            instrument_table(format!("Bottom {n} Lowest {mcap} Assets"), &self.bottom)
        )?;

        if let Some(actionable) = &self.actionable {
            write!(f, "{}", actionable_table(actionable))?;
        }

        writeln!(f)?;
        writeln!(f, "{}", banner("Unactionable (Close-Only) Symbols", 25))?;
        if self.unactionable.is_empty() {
            writeln!(f, "None.")?;
        }
        for i in &self.unactionable {
            writeln!(f, "- {} ({})", i.symbol, i.industry)?;
        }
        Ok(())
    }
}
