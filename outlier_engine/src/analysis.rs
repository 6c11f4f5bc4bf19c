//! End-to-end analysis of a cleaned dataset.
//!
//! [`analyze`] runs grouping, bounds, classification and ranking in one pass
//! and returns an [`AnalysisReport`] that borrows from the dataset. Rendering
//! lives in [`crate::report`].

use instrument_loader::{Dataset, Instrument, LoadWarning};
use tracing::{debug, info};

use crate::{
    classify::{ClassifiedInstrument, classify, classify_all},
    config::{AnalysisConfig, AnalysisMode, FileProfile, RatioColumn},
    grouping::{GroupKind, build_groups},
    rank::{ActionableOutlier, actionable_outliers, bottom_n, top_n, unactionable},
    stats::{BoundCalculator, BoundsTable, GlobalStats, GroupStats},
};

/// Outliers of one group on one ratio column.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupReport<'a> {
    pub name: String,
    pub kind: GroupKind,
    pub size: usize,
    pub column: RatioColumn,
    pub stats: GroupStats,
    /// Members outside the bounds, in input order.
    pub outliers: Vec<ClassifiedInstrument<'a>>,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct AnalysisReport<'a> {
    pub mode: AnalysisMode,
    pub profile: FileProfile,
    pub minimum_group_size: usize,
    pub warnings: &'a [LoadWarning],
    /// Only groups with at least one outlier, in grouping order.
    pub group_reports: Vec<GroupReport<'a>>,
    /// Size of the catch-all pool when it was too small to analyse.
    pub undersized_miscellaneous: Option<usize>,
    pub bounds: BoundsTable,
    pub global: Vec<GlobalStats>,
    pub top: Vec<ClassifiedInstrument<'a>>,
    pub bottom: Vec<ClassifiedInstrument<'a>>,
    /// Present in dual mode only.
    pub actionable: Option<Vec<ActionableOutlier<'a>>>,
    pub var_extreme_slice: usize,
    pub unactionable: Vec<&'a Instrument>,
    /// Every tradable instrument, in input order.
    pub classified: Vec<ClassifiedInstrument<'a>>,
}

/// Instruments that take part in the statistics: tradable, with every ratio
/// of the mode present.
pub fn analysable<'a>(dataset: &'a Dataset, mode: AnalysisMode) -> Vec<&'a Instrument> {
    dataset
        .tradable()
        .filter(|i| mode.ratio_columns().iter().all(|c| c.value(i).is_some()))
        .collect()
}

/// Run the full analysis.
pub fn analyze<'a>(
    dataset: &'a Dataset,
    profile: FileProfile,
    config: &AnalysisConfig,
) -> AnalysisReport<'a> {
    let mode = config.mode;
    let columns = mode.ratio_columns();
    let instruments = analysable(dataset, mode);
    info!(
        total = dataset.len(),
        analysable = instruments.len(),
        mode = ?mode,
        "starting outlier analysis"
    );

    let grouping = build_groups(&instruments, config.minimum_group_size);
    let calculator = BoundCalculator::from_config(config);
    let mut bounds = BoundsTable::default();
    for group in &grouping.groups {
        calculator.compute_bounds(&group.name, &group.members, columns, &mut bounds);
    }
    debug!(
        groups = grouping.groups.len(),
        bounded = bounds.len(),
        "group bounds computed"
    );

    let mut group_reports = Vec::new();
    for group in &grouping.groups {
        for &column in columns {
            let Some(stats) = bounds.stats(&group.name, column).copied() else {
                continue;
            };
            let outliers: Vec<ClassifiedInstrument<'a>> = group
                .members
                .iter()
                .filter(|i| {
                    column
                        .value(i)
                        .is_some_and(|v| v < stats.bounds.lower || v > stats.bounds.upper)
                })
                .map(|&instrument| ClassifiedInstrument {
                    instrument,
                    group: group.name.clone(),
                    note: classify(instrument, &bounds, &grouping.index, mode),
                })
                .collect();
            if !outliers.is_empty() {
                group_reports.push(GroupReport {
                    name: group.name.clone(),
                    kind: group.kind,
                    size: group.len(),
                    column,
                    stats,
                    outliers,
                });
            }
        }
    }

    let classified = classify_all(&instruments, &bounds, &grouping.index, mode);
    let global = columns
        .iter()
        .map(|&c| GlobalStats::compute(&instruments, c, config.fence_multiplier))
        .collect();

    let top = top_n(&classified, RatioColumn::McapEv, profile.top_n);
    let bottom = bottom_n(&classified, RatioColumn::McapEv, profile.top_n);
    let actionable = (mode == AnalysisMode::Dual)
        .then(|| actionable_outliers(&classified, config.var_extreme_slice));
    let unactionable = unactionable(dataset.close_only());

    info!(
        outlier_groups = group_reports.len(),
        flagged = classified.iter().filter(|c| c.note.is_outlier()).count(),
        unactionable = unactionable.len(),
        "outlier analysis finished"
    );

    AnalysisReport {
        mode,
        profile,
        minimum_group_size: config.minimum_group_size,
        warnings: &dataset.warnings,
        group_reports,
        undersized_miscellaneous: grouping.undersized_miscellaneous,
        bounds,
        global,
        top,
        bottom,
        actionable,
        var_extreme_slice: config.var_extreme_slice,
        unactionable,
        classified,
    }
}
