//! Quartiles and Tukey fences.
//!
//! Quantiles use linear interpolation between order statistics, the usual
//! default of dataframe libraries: the value at rank `q * (n - 1)` of the
//! sorted sample, interpolated between its neighbours.

use std::collections::BTreeMap;

use instrument_loader::Instrument;
use serde::Serialize;
use tracing::debug;

use crate::config::{AnalysisConfig, RatioColumn};

/// Quantile `q` in `[0, 1]` of an ascending sample.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    match sorted.len() {
        0 => None,
        1 => Some(sorted[0]),
        n => {
            let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let frac = rank - lower as f64;
            Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
        }
    }
}

/// First and third quartile of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
}

impl Quartiles {
    /// Quartiles of the finite values; `None` for an empty sample.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);
        let q1 = quantile(&sorted, 0.25)?;
        let q3 = quantile(&sorted, 0.75)?;
        Some(Self { q1, q3, iqr: q3 - q1 })
    }

    /// Tukey fence `[Q1 - k*IQR, Q3 + k*IQR]`, even for a zero IQR.
    pub fn fence(&self, multiplier: f64) -> Bounds {
        Bounds {
            lower: self.q1 - multiplier * self.iqr,
            upper: self.q3 + multiplier * self.iqr,
        }
    }

    /// The fence, or `None` when the distribution is degenerate (`IQR <= 0`).
    pub fn outlier_bounds(&self, multiplier: f64) -> Option<Bounds> {
        (self.iqr > 0.0).then(|| self.fence(multiplier))
    }
}

/// Inclusive range of values considered normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

/// What was measured for one group and column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupStats {
    /// Number of instruments in the group.
    pub size: usize,
    pub quartiles: Quartiles,
    pub bounds: Bounds,
}

/// Bounds keyed by group name, then ratio column.
///
/// Only groups that met the minimum size and had a non-zero IQR have entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoundsTable {
    groups: BTreeMap<String, BTreeMap<RatioColumn, GroupStats>>,
}

impl BoundsTable {
    pub fn stats(&self, group: &str, column: RatioColumn) -> Option<&GroupStats> {
        self.groups.get(group)?.get(&column)
    }

    pub fn get(&self, group: &str, column: RatioColumn) -> Option<&Bounds> {
        self.stats(group, column).map(|s| &s.bounds)
    }

    pub fn insert(&mut self, group: &str, column: RatioColumn, stats: GroupStats) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(column, stats);
    }

    /// Number of `(group, column)` entries.
    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Computes per-group bounds into a shared [`BoundsTable`].
#[derive(Debug, Clone, Copy)]
pub struct BoundCalculator {
    pub minimum_group_size: usize,
    pub fence_multiplier: f64,
}

impl BoundCalculator {
    pub fn from_config(cfg: &AnalysisConfig) -> Self {
        Self {
            minimum_group_size: cfg.minimum_group_size,
            fence_multiplier: cfg.fence_multiplier,
        }
    }

    /// Store bounds for every column of `columns` with a usable spread.
    ///
    /// No-op for groups below the minimum size. Columns whose IQR is zero
    /// are skipped, so the group is never flagged on that ratio.
    pub fn compute_bounds(
        &self,
        group_name: &str,
        members: &[&Instrument],
        columns: &[RatioColumn],
        table: &mut BoundsTable,
    ) {
        if members.len() < self.minimum_group_size {
            return;
        }
        for &column in columns {
            let Some(quartiles) = Quartiles::from_values(members.iter().filter_map(|i| column.value(i)))
            else {
                continue;
            };
            match quartiles.outlier_bounds(self.fence_multiplier) {
                Some(bounds) => table.insert(
                    group_name,
                    column,
                    GroupStats {
                        size: members.len(),
                        quartiles,
                        bounds,
                    },
                ),
                None => debug!(group = group_name, column = column.header(), "zero IQR, no bounds"),
            }
        }
    }
}

/// Distribution of one ratio over the whole tradable set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlobalStats {
    pub column: RatioColumn,
    pub count: usize,
    pub quartiles: Option<Quartiles>,
    pub bounds: Option<Bounds>,
}

impl GlobalStats {
    /// Always produces a fence when there is data, even for a zero IQR.
    pub fn compute(instruments: &[&Instrument], column: RatioColumn, multiplier: f64) -> Self {
        let values: Vec<f64> = instruments.iter().filter_map(|i| column.value(i)).collect();
        let quartiles = Quartiles::from_values(values.iter().copied());
        Self {
            column,
            count: values.len(),
            quartiles,
            bounds: quartiles.map(|q| q.fence(multiplier)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inst(symbol: &str, ratio: f64) -> Instrument {
        Instrument::new(symbol, "Tech", "Software", Some(ratio))
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile(&sorted, 0.75), Some(3.25));
        assert_eq!(quantile(&[7.0], 0.25), Some(7.0));
        assert_eq!(quantile(&[], 0.25), None);
    }

    #[test]
    fn five_point_example_fence() {
        let q = Quartiles::from_values([1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(q.q1, 2.0);
        assert_eq!(q.q3, 4.0);
        assert_eq!(q.iqr, 2.0);
        assert_eq!(
            q.outlier_bounds(1.5),
            Some(Bounds {
                lower: -1.0,
                upper: 7.0
            })
        );
    }

    #[test]
    fn order_of_input_does_not_matter() {
        let a = Quartiles::from_values([100.0, 3.0, 1.0, 4.0, 2.0]).unwrap();
        let b = Quartiles::from_values([1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_iqr_has_no_outlier_bounds() {
        let q = Quartiles::from_values([5.0; 8]).unwrap();
        assert_eq!(q.iqr, 0.0);
        assert_eq!(q.outlier_bounds(1.5), None);
        // The plain fence is still available for global statistics.
        assert_eq!(
            q.fence(1.5),
            Bounds {
                lower: 5.0,
                upper: 5.0
            }
        );
    }

    #[test]
    fn small_groups_get_no_bounds() {
        let rows: Vec<Instrument> = (1..=4).map(|i| inst(&format!("S{i}"), i as f64)).collect();
        let refs: Vec<&Instrument> = rows.iter().collect();
        let calc = BoundCalculator {
            minimum_group_size: 5,
            fence_multiplier: 1.5,
        };
        let mut table = BoundsTable::default();
        calc.compute_bounds("Software", &refs, &[RatioColumn::McapEv], &mut table);
        assert!(table.is_empty());
    }

    #[test]
    fn bounds_are_stored_per_group_and_column() {
        let rows: Vec<Instrument> = [1.0, 2.0, 3.0, 4.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, v)| inst(&format!("S{i}"), *v).with_var_to_ask(Some(0.5)))
            .collect();
        let refs: Vec<&Instrument> = rows.iter().collect();
        let calc = BoundCalculator {
            minimum_group_size: 5,
            fence_multiplier: 1.5,
        };
        let mut table = BoundsTable::default();
        calc.compute_bounds(
            "Software",
            &refs,
            &[RatioColumn::McapEv, RatioColumn::VarToAsk],
            &mut table,
        );

        // VaR is constant: degenerate, skipped.
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("Software", RatioColumn::VarToAsk), None);
        let stats = table.stats("Software", RatioColumn::McapEv).unwrap();
        assert_eq!(stats.size, 5);
        assert_eq!(stats.bounds.lower, -1.0);
        assert_eq!(stats.bounds.upper, 7.0);
    }

    #[test]
    fn missing_values_are_ignored_but_members_counted() {
        let mut rows: Vec<Instrument> = [1.0, 2.0, 3.0, 4.0]
            .iter()
            .enumerate()
            .map(|(i, v)| inst(&format!("S{i}"), *v))
            .collect();
        rows.push(Instrument::new("NA", "Tech", "Software", None));
        let refs: Vec<&Instrument> = rows.iter().collect();
        let calc = BoundCalculator {
            minimum_group_size: 5,
            fence_multiplier: 1.5,
        };
        let mut table = BoundsTable::default();
        calc.compute_bounds("Software", &refs, &[RatioColumn::McapEv], &mut table);
        let stats = table.stats("Software", RatioColumn::McapEv).unwrap();
        assert_eq!(stats.quartiles.q1, 1.75);
        assert_eq!(stats.quartiles.q3, 3.25);
    }

    #[test]
    fn global_stats_always_fence() {
        let rows: Vec<Instrument> = (0..6).map(|i| inst(&format!("S{i}"), 2.0)).collect();
        let refs: Vec<&Instrument> = rows.iter().collect();
        let g = GlobalStats::compute(&refs, RatioColumn::McapEv, 1.5);
        assert_eq!(g.count, 6);
        assert_eq!(
            g.bounds,
            Some(Bounds {
                lower: 2.0,
                upper: 2.0
            })
        );

        let empty = GlobalStats::compute(&[], RatioColumn::McapEv, 1.5);
        assert_eq!(empty.count, 0);
        assert_eq!(empty.quartiles, None);
        assert_eq!(empty.bounds, None);
    }
}
