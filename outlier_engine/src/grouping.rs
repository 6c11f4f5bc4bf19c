//! Industry grouping with sector and miscellaneous fallbacks.
//!
//! Groups, in priority order:
//! 1. an industry with at least `minimum` instruments is its own group;
//! 2. instruments of smaller industries are pooled per sector, and a sector
//!    pool of at least `minimum` becomes `AGGREGATED {SECTOR} INDUSTRIES`
//!    (`AGGREGATED MISCELLANEOUS` for the `"Undefined"` sector);
//! 3. every remaining instrument of an undersized sector pool lands in the
//!    catch-all, which only exists if it reaches `minimum` too.
//!
//! The catch-all is named `AGGREGATED MISCELLANEOUS` unless the `"Undefined"`
//! sector already took that name, in which case it becomes
//! `AGGREGATED MISCELLANEOUS (OTHER SECTORS)`. Group names are unique either way.
//!
//! [`GroupIndex::resolve`] answers "which group owns this instrument" from the
//! same decisions, so bound computation and classification can never disagree.

use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet},
};

use instrument_loader::{Instrument, models::columns::UNDEFINED_SECTOR};
use serde::Serialize;

/// Name of the catch-all group.
pub const MISCELLANEOUS_GROUP: &str = "AGGREGATED MISCELLANEOUS";

/// Name of the catch-all when the `"Undefined"` sector formed its own aggregate.
pub const OTHER_SECTORS_GROUP: &str = "AGGREGATED MISCELLANEOUS (OTHER SECTORS)";

/// Aggregate group name for a sector; `"Undefined"` maps to the catch-all.
pub fn sector_group_name(sector: &str) -> String {
    if sector == UNDEFINED_SECTOR {
        MISCELLANEOUS_GROUP.to_string()
    } else {
        format!("AGGREGATED {} INDUSTRIES", sector.to_uppercase())
    }
}

/// Catch-all name given the sectors that formed their own aggregate.
pub fn miscellaneous_group_name(aggregated_sectors: &BTreeSet<String>) -> &'static str {
    if aggregated_sectors.contains(UNDEFINED_SECTOR) {
        OTHER_SECTORS_GROUP
    } else {
        MISCELLANEOUS_GROUP
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum GroupKind {
    Industry,
    Sector,
    Miscellaneous,
}

/// A named set of instruments that shares one set of bounds.
#[derive(Debug, Clone)]
pub struct Group<'a> {
    pub name: String,
    pub kind: GroupKind,
    /// Members in input order.
    pub members: Vec<&'a Instrument>,
}

impl Group<'_> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Result of [`partition`].
#[derive(Debug, Clone, Default)]
pub struct IndustryPartition<'a> {
    /// Industries large enough to stand alone, sorted by name.
    pub industry_groups: Vec<Group<'a>>,
    /// Industries below the minimum size.
    pub small_industries: BTreeSet<String>,
}

/// Split instruments into standalone industries and small ones.
pub fn partition<'a>(instruments: &[&'a Instrument], minimum: usize) -> IndustryPartition<'a> {
    let mut by_industry: BTreeMap<&str, Vec<&'a Instrument>> = BTreeMap::new();
    for &i in instruments {
        by_industry.entry(i.industry.as_str()).or_default().push(i);
    }

    let mut out = IndustryPartition::default();
    for (industry, members) in by_industry {
        if members.len() >= minimum {
            out.industry_groups.push(Group {
                name: industry.to_string(),
                kind: GroupKind::Industry,
                members,
            });
        } else {
            out.small_industries.insert(industry.to_string());
        }
    }
    out
}

/// Result of [`aggregate_small`].
#[derive(Debug, Clone, Default)]
pub struct SmallAggregation<'a> {
    /// Sector aggregates, sorted by sector name.
    pub sector_groups: Vec<Group<'a>>,
    /// Sectors that formed their own aggregate.
    pub aggregated_sectors: BTreeSet<String>,
    pub miscellaneous: Option<Group<'a>>,
    /// Size of the leftover pool when it was too small to form a group.
    pub undersized_miscellaneous: Option<usize>,
}

/// Pool instruments of small industries by sector, then into the catch-all.
pub fn aggregate_small<'a>(
    instruments: &[&'a Instrument],
    small_industries: &BTreeSet<String>,
    minimum: usize,
) -> SmallAggregation<'a> {
    let mut by_sector: BTreeMap<&str, Vec<&'a Instrument>> = BTreeMap::new();
    for &i in instruments
        .iter()
        .filter(|i| small_industries.contains(&i.industry))
    {
        by_sector.entry(i.sector.as_str()).or_default().push(i);
    }

    let mut out = SmallAggregation::default();
    let mut leftovers: Vec<&'a Instrument> = Vec::new();

    for (sector, members) in by_sector {
        if members.len() >= minimum {
            out.aggregated_sectors.insert(sector.to_string());
            out.sector_groups.push(Group {
                name: sector_group_name(sector),
                kind: GroupKind::Sector,
                members,
            });
        } else {
            leftovers.extend(members);
        }
    }

    if !leftovers.is_empty() {
        if leftovers.len() >= minimum {
            out.miscellaneous = Some(Group {
                name: miscellaneous_group_name(&out.aggregated_sectors).to_string(),
                kind: GroupKind::Miscellaneous,
                members: leftovers,
            });
        } else {
            out.undersized_miscellaneous = Some(leftovers.len());
        }
    }
    out
}

/// Maps an instrument's taxonomy to the name of the group that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupIndex {
    small_industries: BTreeSet<String>,
    aggregated_sectors: BTreeSet<String>,
    miscellaneous: &'static str,
}

impl Default for GroupIndex {
    fn default() -> Self {
        Self::new(BTreeSet::new(), BTreeSet::new())
    }
}

impl GroupIndex {
    pub fn new(small_industries: BTreeSet<String>, aggregated_sectors: BTreeSet<String>) -> Self {
        let miscellaneous = miscellaneous_group_name(&aggregated_sectors);
        Self {
            small_industries,
            aggregated_sectors,
            miscellaneous,
        }
    }

    /// Owning group name for `(industry, sector)`.
    ///
    /// Instruments routed to a catch-all that was too small resolve to the
    /// catch-all name, which then simply has no bounds.
    pub fn resolve<'s>(&self, industry: &'s str, sector: &str) -> Cow<'s, str> {
        if !self.small_industries.contains(industry) {
            Cow::Borrowed(industry)
        } else if self.aggregated_sectors.contains(sector) {
            Cow::Owned(sector_group_name(sector))
        } else {
            Cow::Borrowed(self.miscellaneous)
        }
    }

    pub fn resolve_instrument<'s>(&self, instrument: &'s Instrument) -> Cow<'s, str> {
        self.resolve(&instrument.industry, &instrument.sector)
    }

    pub fn small_industries(&self) -> &BTreeSet<String> {
        &self.small_industries
    }

    /// Name the catch-all goes by in this run.
    pub fn miscellaneous(&self) -> &'static str {
        self.miscellaneous
    }
}

/// All groups of a run plus the index that resolves them.
#[derive(Debug, Clone, Default)]
pub struct Grouping<'a> {
    /// Industries, then sector aggregates, then the catch-all.
    pub groups: Vec<Group<'a>>,
    pub index: GroupIndex,
    pub undersized_miscellaneous: Option<usize>,
}

/// Run [`partition`] then [`aggregate_small`].
pub fn build_groups<'a>(instruments: &[&'a Instrument], minimum: usize) -> Grouping<'a> {
    let IndustryPartition {
        industry_groups,
        small_industries,
    } = partition(instruments, minimum);

    let SmallAggregation {
        sector_groups,
        aggregated_sectors,
        miscellaneous,
        undersized_miscellaneous,
    } = if small_industries.is_empty() {
        SmallAggregation::default()
    } else {
        aggregate_small(instruments, &small_industries, minimum)
    };

    let mut groups = industry_groups;
    groups.extend(sector_groups);
    groups.extend(miscellaneous);

    Grouping {
        groups,
        index: GroupIndex::new(small_industries, aggregated_sectors),
        undersized_miscellaneous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn inst(symbol: &str, sector: &str, industry: &str) -> Instrument {
        Instrument::new(symbol, sector, industry, Some(1.0))
    }

    fn many(prefix: &str, n: usize, sector: &str, industry: &str) -> Vec<Instrument> {
        (0..n)
            .map(|k| inst(&format!("{prefix}{k}"), sector, industry))
            .collect()
    }

    fn names(groups: &[Group<'_>]) -> Vec<String> {
        groups.iter().map(|g| g.name.clone()).collect()
    }

    #[test]
    fn partition_splits_on_minimum() {
        let mut rows = many("SW", 5, "Technology", "Software");
        rows.extend(many("BK", 4, "Finance", "Banks"));
        let refs: Vec<&Instrument> = rows.iter().collect();

        let p = partition(&refs, 5);
        assert_eq!(names(&p.industry_groups), vec!["Software"]);
        assert_eq!(p.industry_groups[0].kind, GroupKind::Industry);
        assert_eq!(p.small_industries, BTreeSet::from(["Banks".to_string()]));
    }

    #[test]
    fn small_industries_pool_by_sector() {
        let mut rows = many("A", 3, "Technology", "Semis");
        rows.extend(many("B", 2, "Technology", "Hardware"));
        rows.extend(many("C", 2, "Energy", "Oil"));
        let refs: Vec<&Instrument> = rows.iter().collect();

        let g = build_groups(&refs, 5);
        assert_eq!(names(&g.groups), vec!["AGGREGATED TECHNOLOGY INDUSTRIES"]);
        assert_eq!(g.groups[0].len(), 5);
        assert_eq!(g.groups[0].kind, GroupKind::Sector);
        // Energy's 2 leftovers cannot form a catch-all.
        assert_eq!(g.undersized_miscellaneous, Some(2));
    }

    #[test]
    fn undefined_and_small_sectors_form_miscellaneous() {
        let mut rows = many("U", 3, "Undefined", "Unknown Industry");
        rows.extend(many("F", 2, "Foo", "Foo Industry"));
        let refs: Vec<&Instrument> = rows.iter().collect();

        let g = build_groups(&refs, 5);
        assert_eq!(names(&g.groups), vec![MISCELLANEOUS_GROUP]);
        assert_eq!(g.groups[0].kind, GroupKind::Miscellaneous);
        assert_eq!(g.groups[0].len(), 5);
        assert_eq!(g.undersized_miscellaneous, None);

        // Every member resolves to the catch-all, Foo included.
        for m in &g.groups[0].members {
            assert_eq!(g.index.resolve_instrument(m), MISCELLANEOUS_GROUP);
        }
    }

    #[test]
    fn four_leftovers_form_no_group() {
        let mut rows = many("U", 2, "Undefined", "Unknown Industry");
        rows.extend(many("F", 2, "Foo", "Foo Industry"));
        let refs: Vec<&Instrument> = rows.iter().collect();

        let g = build_groups(&refs, 5);
        assert!(g.groups.is_empty());
        assert_eq!(g.undersized_miscellaneous, Some(4));
    }

    #[test]
    fn large_undefined_industry_stands_alone() {
        let mut rows = many("V", 1, "Undefined", "Other Unknown");
        rows.extend(many("U", 6, "Undefined", "Unknown Industry"));
        let refs: Vec<&Instrument> = rows.iter().collect();

        let g = build_groups(&refs, 5);
        assert_eq!(names(&g.groups), vec!["Unknown Industry"]);
        assert_eq!(g.undersized_miscellaneous, Some(1));
    }

    #[test]
    fn undefined_aggregate_stands_apart_from_leftovers() {
        let mut rows: Vec<Instrument> = (0..6)
            .map(|k| inst(&format!("W{k}"), "Undefined", &format!("Industry {k}")))
            .collect();
        rows.extend(many("F", 4, "Foo", "Foo Industry"));
        let refs: Vec<&Instrument> = rows.iter().collect();

        let g = build_groups(&refs, 5);
        let got: Vec<(&str, usize)> = g.groups.iter().map(|g| (g.name.as_str(), g.len())).collect();
        assert_eq!(got, [(MISCELLANEOUS_GROUP, 6)]);
        assert_eq!(g.groups[0].kind, GroupKind::Sector);
        assert_eq!(g.undersized_miscellaneous, Some(4));

        // Foo must not borrow the Undefined aggregate's bounds.
        assert_eq!(g.index.miscellaneous(), OTHER_SECTORS_GROUP);
        assert_eq!(g.index.resolve("Foo Industry", "Foo"), OTHER_SECTORS_GROUP);
        assert_eq!(g.index.resolve("Industry 0", "Undefined"), MISCELLANEOUS_GROUP);
    }

    #[test]
    fn catch_all_is_renamed_when_undefined_aggregate_exists() {
        let mut rows: Vec<Instrument> = (0..5)
            .map(|k| inst(&format!("W{k}"), "Undefined", &format!("Industry {k}")))
            .collect();
        rows.extend(many("F", 3, "Foo", "Foo Industry"));
        rows.extend(many("B", 3, "Bar", "Bar Industry"));
        let refs: Vec<&Instrument> = rows.iter().collect();

        let g = build_groups(&refs, 5);
        let got: Vec<(&str, GroupKind, usize)> = g
            .groups
            .iter()
            .map(|g| (g.name.as_str(), g.kind, g.len()))
            .collect();
        assert_eq!(
            got,
            [
                (MISCELLANEOUS_GROUP, GroupKind::Sector, 5),
                (OTHER_SECTORS_GROUP, GroupKind::Miscellaneous, 6),
            ]
        );
        assert_eq!(g.undersized_miscellaneous, None);
        assert_eq!(g.index.resolve("Bar Industry", "Bar"), OTHER_SECTORS_GROUP);
    }

    #[test]
    fn sector_name_is_upper_cased_except_undefined() {
        assert_eq!(
            sector_group_name("Consumer Cyclical"),
            "AGGREGATED CONSUMER CYCLICAL INDUSTRIES"
        );
        assert_eq!(sector_group_name("Undefined"), MISCELLANEOUS_GROUP);
    }

    #[test]
    fn group_order_is_industry_sector_misc() {
        let mut rows = many("Z", 5, "Technology", "Zinc");
        rows.extend(many("A", 5, "Technology", "Aluminium"));
        rows.extend(many("S", 1, "Health", "Clinics"));
        rows.extend(many("T", 4, "Health", "Labs"));
        rows.extend(many("U", 4, "Undefined", "Odd"));
        rows.extend(many("X", 1, "Undefined", "Odd2"));
        rows.extend(many("B", 3, "Basic Materials", "Steel"));
        rows.extend(many("C", 2, "Communication", "Telecom"));
        let refs: Vec<&Instrument> = rows.iter().collect();

        let g = build_groups(&refs, 5);
        assert_eq!(
            names(&g.groups),
            vec![
                "Aluminium",
                "Zinc",
                "AGGREGATED HEALTH INDUSTRIES",
                MISCELLANEOUS_GROUP,
                OTHER_SECTORS_GROUP,
            ]
        );
    }

    const INDUSTRIES: [&str; 6] = ["Software", "Banks", "Oil", "Retail", "Biotech", "Mining"];
    const SECTORS: [&str; 4] = ["Technology", "Finance", "Energy", "Undefined"];

    proptest! {
        #[test]
        fn members_resolve_to_their_own_group(
            rows in proptest::collection::vec((0usize..6, 0usize..4), 0..60),
            minimum in 1usize..8,
        ) {
            let instruments: Vec<Instrument> = rows
                .iter()
                .enumerate()
                .map(|(k, (i, s))| inst(&format!("S{k}"), SECTORS[*s], INDUSTRIES[*i]))
                .collect();
            let refs: Vec<&Instrument> = instruments.iter().collect();
            let g = build_groups(&refs, minimum);

            let unique: BTreeSet<&str> = g.groups.iter().map(|g| g.name.as_str()).collect();
            prop_assert_eq!(unique.len(), g.groups.len());

            for group in &g.groups {
                prop_assert!(group.len() >= minimum);
                for m in &group.members {
                    prop_assert_eq!(g.index.resolve_instrument(m), group.name.as_str());
                }
            }

            // Each instrument lands in exactly one group or in the undersized pool.
            let grouped: usize = g.groups.iter().map(Group::len).sum();
            prop_assert_eq!(grouped + g.undersized_miscellaneous.unwrap_or(0), instruments.len());
        }
    }
}
