use std::io::Write;

use instrument_loader::{Error, LoadOptions, LoadWarning, load_instruments};
use tempfile::NamedTempFile;

#[test]
fn loads_semicolon_export_from_disk() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        "Symbol;SectorName;IndustryName;MCap/EV (%);TradeMode;AskPrice;BidPrice;VaR_to_Ask_Ratio"
    )?;
    writeln!(file, "AAA;Technology;Software;80.1;4;20;19.8;0.031")?;
    writeln!(file, "BBB;Technology;Software;-inf;4;20;19.8;0.031")?;
    writeln!(file, "CCC;Undefined;Closed Fund;12.5;3;5;4.5;0.2")?;

    let ds = load_instruments(file.path(), &LoadOptions::default())?;

    let symbols: Vec<_> = ds.instruments.iter().map(|i| i.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AAA", "CCC"]);
    assert_eq!(
        ds.warnings,
        vec![LoadWarning::InvalidMcapEv {
            symbol: "BBB".into()
        }]
    );
    assert_eq!(ds.close_only().count(), 1);
    assert_eq!(ds.tradable().count(), 1);
    Ok(())
}

#[test]
fn missing_file_is_a_friendly_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.csv");
    let err = load_instruments(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
    assert_eq!(
        err.to_string(),
        format!("The file '{}' was not found.", path.display())
    );
}
