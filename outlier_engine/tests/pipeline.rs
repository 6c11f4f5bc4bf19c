use std::{fs, path::PathBuf};

use instrument_loader::{LoadOptions, load_instruments};
use outlier_engine::{
    AnalysisConfig, AnalysisMode, analyze,
    classify::Note,
    grouping::{GroupKind, MISCELLANEOUS_GROUP},
};
use tempfile::TempDir;

const HEADER: &str =
    "Symbol;SectorName;IndustryName;MCap/EV (%);TradeMode;AskPrice;BidPrice;VaR_to_Ask_Ratio";

fn export() -> String {
    let mut rows = vec![HEADER.to_string()];
    // One standalone industry with a clear high outlier.
    for (k, mcap) in [10.0, 20.0, 30.0, 40.0, 900.0].iter().enumerate() {
        rows.push(format!("SW{k};Technology;Software;{mcap};4;100;99;{}", 0.01 * (5 - k) as f64));
    }
    // Small industries: 3 undefined plus 2 from a small sector make a catch-all of 5.
    for (k, mcap) in [50.0, 51.0, 52.0].iter().enumerate() {
        rows.push(format!("UND{k};Undefined;Unknown;{mcap};4;10;9.5;0.5"));
    }
    rows.push("FOO0;Foo;Foo Industry;53;4;10;9.5;0.6".into());
    rows.push("FOO1;Foo;Foo Industry;-400;4;10;9.5;0.7".into());
    // Excluded rows.
    rows.push("CLOSED;Energy;Oil;5;3;1;1;0.1".into());
    rows.push("BROKEN;Energy;Oil;-inf;4;1;1;0.1".into());
    rows.join("\n") + "\n"
}

fn write_export(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, export()).unwrap();
    path
}

#[test]
fn single_mode_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_export(&dir, "Stocks_export.csv");
    let dataset = load_instruments(&path, &LoadOptions::default()).unwrap();
    assert_eq!(dataset.len(), 11);
    assert_eq!(dataset.warnings.len(), 1);

    let cfg = AnalysisConfig::default();
    let profile = cfg.file_profile(&path);
    assert_eq!(profile.top_n, 50);
    let report = analyze(&dataset, profile, &cfg);

    let names: Vec<(&str, GroupKind)> = report
        .group_reports
        .iter()
        .map(|g| (g.name.as_str(), g.kind))
        .collect();
    assert_eq!(
        names,
        [
            ("Software", GroupKind::Industry),
            (MISCELLANEOUS_GROUP, GroupKind::Miscellaneous)
        ]
    );
    assert_eq!(report.undersized_miscellaneous, None);

    let flagged: Vec<(&str, String)> = report
        .classified
        .iter()
        .filter(|c| c.note.is_outlier())
        .map(|c| (c.instrument.symbol.as_str(), c.note.to_string()))
        .collect();
    assert_eq!(
        flagged,
        [
            ("SW4", "(HIGH - Statistically Significant)".to_string()),
            ("FOO1", "(LOW - Statistically Significant)".to_string()),
        ]
    );

    // Small-sector members use the catch-all bounds, like the catch-all itself.
    let foo = report
        .classified
        .iter()
        .find(|c| c.instrument.symbol == "FOO0")
        .unwrap();
    assert_eq!(foo.group, MISCELLANEOUS_GROUP);

    assert_eq!(report.unactionable.len(), 1);
    assert!(report.classified.iter().all(|c| c.instrument.symbol != "CLOSED"));

    let text = report.to_string();
    assert!(text.contains("Detected file type: Stocks. Displaying top/bottom 50 assets at end."));
    assert!(text.contains("WARNING: BROKEN has an invalid MCap/EV (%) value and will be excluded."));
    assert!(text.contains("Analysis for: AGGREGATED MISCELLANEOUS"));
    assert_eq!(text.matches("- CLOSED (Oil)").count(), 1);
}

#[test]
fn analysis_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_export(&dir, "cfd.csv");
    let dataset = load_instruments(&path, &LoadOptions::default()).unwrap();
    let cfg = AnalysisConfig {
        mode: AnalysisMode::Dual,
        ..AnalysisConfig::default()
    };

    let a = analyze(&dataset, cfg.file_profile(&path), &cfg);
    let b = analyze(&dataset, cfg.file_profile(&path), &cfg);
    assert_eq!(
        serde_json::to_string(&a.classified).unwrap(),
        serde_json::to_string(&b.classified).unwrap()
    );
    assert_eq!(a.actionable, b.actionable);
    assert_eq!(a.to_string(), b.to_string());
}

#[test]
fn dual_mode_actionable_outliers() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_export(&dir, "futures.csv");
    let dataset = load_instruments(&path, &LoadOptions::default()).unwrap();
    let cfg = AnalysisConfig {
        mode: AnalysisMode::Dual,
        var_extreme_slice: 3,
        ..AnalysisConfig::default()
    };
    let report = analyze(&dataset, cfg.file_profile(&path), &cfg);
    assert_eq!(report.profile.top_n, 5);

    let actionable = report.actionable.as_ref().unwrap();
    let got: Vec<(&str, String)> = actionable
        .iter()
        .map(|a| (a.row.instrument.symbol.as_str(), a.note_text()))
        .collect();
    // SW4 has one of the three lowest VaR ratios; FOO1 one of the three highest.
    assert_eq!(
        got,
        [
            ("SW4", "MCap/EV Outlier: MCap/EV (HIGH) in Bottom 3 VaR".to_string()),
            ("FOO1", "MCap/EV Outlier: MCap/EV (LOW) in Top 3 VaR".to_string()),
        ]
    );
    assert!(
        report
            .classified
            .iter()
            .all(|c| !matches!(c.note, Note::Single(_)))
    );
}
