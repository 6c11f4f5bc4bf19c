//! CSV ingest and cleaning.
//!
//! Turns an instrument export into a [`Dataset`]:
//! - header names are trimmed and mapped by name, so column order is free;
//! - numeric cells are coerced, anything unparsable becomes `None`;
//! - rows whose MCap/EV is `-inf` are dropped with a warning naming the symbol;
//! - the spread is derived when both price columns exist.
//!
//! Missing columns never abort the load; they are reported as
//! [`LoadWarning::MissingColumns`] and the affected fields stay `None`.

use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    errors::Error,
    models::{
        columns,
        dataset::Dataset,
        instrument::{Instrument, spread_percent},
        warning::LoadWarning,
    },
};

/// Field separator of the export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    /// Pick `;` or `,` from whichever occurs more often in the header line.
    #[default]
    Auto,
    Comma,
    Semicolon,
}

impl Delimiter {
    fn resolve(self, header_line: &str) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Auto => {
                let semis = header_line.matches(';').count();
                let commas = header_line.matches(',').count();
                if semis > commas { b';' } else { b',' }
            }
        }
    }
}

/// Knobs for [`load_instruments`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub delimiter: Delimiter,
}

/// Load and clean an export from disk.
///
/// A missing file maps to [`Error::FileNotFound`] so callers can print a
/// friendly message instead of an I/O error chain.
pub fn load_instruments(path: impl AsRef<Path>, opts: &LoadOptions) -> Result<Dataset, Error> {
    let path = path.as_ref();
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    debug!(path = %path.display(), "loading instrument export");
    load_from_reader(file, opts)
}

/// Load and clean an export from any reader.
pub fn load_from_reader<R: Read>(mut reader: R, opts: &LoadOptions) -> Result<Dataset, Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let header_line = text.lines().next().unwrap_or("");
    let delimiter = opts.delimiter.resolve(header_line);

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(Error::MissingHeader);
    }
    let cols = ColumnIndex::new(&headers);

    let mut dataset = Dataset::default();

    let missing = cols.missing();
    if !missing.is_empty() {
        let w = LoadWarning::MissingColumns(missing);
        warn!("{w}");
        dataset.warnings.push(w);
    }

    let has_prices = cols.ask.is_some() && cols.bid.is_some();
    if !has_prices {
        let w = LoadWarning::SpreadUnavailable;
        warn!("{w}");
        dataset.warnings.push(w);
    }

    for result in rdr.records() {
        let record = result?;
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        let symbol = cell(cols.symbol).to_string();

        let mcap_ev_ratio = match parse_number(cell(cols.mcap_ev)) {
            Some(v) if v == f64::NEG_INFINITY => {
                let w = LoadWarning::InvalidMcapEv { symbol };
                warn!("{w}");
                dataset.warnings.push(w);
                continue;
            }
            other => finite(other),
        };

        let ask_price = finite(parse_number(cell(cols.ask)));
        let bid_price = finite(parse_number(cell(cols.bid)));
        let spread = if has_prices {
            spread_percent(ask_price, bid_price)
        } else {
            None
        };

        dataset.instruments.push(Instrument {
            symbol,
            sector: cell(cols.sector).to_string(),
            industry: cell(cols.industry).to_string(),
            mcap_ev_ratio,
            var_to_ask_ratio: finite(parse_number(cell(cols.var_to_ask))),
            ask_price,
            bid_price,
            spread_percent: spread,
            trade_mode: parse_trade_mode(cell(cols.trade_mode)),
        });
    }

    debug!(
        rows = dataset.instruments.len(),
        warnings = dataset.warnings.len(),
        "instrument export loaded"
    );
    Ok(dataset)
}

/// Header positions of the known columns.
#[derive(Debug, Default)]
struct ColumnIndex {
    symbol: Option<usize>,
    sector: Option<usize>,
    industry: Option<usize>,
    mcap_ev: Option<usize>,
    trade_mode: Option<usize>,
    ask: Option<usize>,
    bid: Option<usize>,
    var_to_ask: Option<usize>,
    present: Vec<String>,
}

impl ColumnIndex {
    fn new(headers: &StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Self {
            symbol: find(columns::SYMBOL),
            sector: find(columns::SECTOR),
            industry: find(columns::INDUSTRY),
            mcap_ev: find(columns::MCAP_EV),
            trade_mode: find(columns::TRADE_MODE),
            ask: find(columns::ASK_PRICE),
            bid: find(columns::BID_PRICE),
            var_to_ask: find(columns::VAR_TO_ASK),
            present: headers.iter().map(str::to_string).collect(),
        }
    }

    fn missing(&self) -> Vec<String> {
        columns::REQUIRED
            .iter()
            .filter(|c| !self.present.iter().any(|p| p == *c))
            .map(|c| c.to_string())
            .collect()
    }
}

/// Parses a numeric cell; infinities are kept, NaN and junk become `None`.
fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| !v.is_nan())
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|v| v.is_finite())
}

/// Trade modes arrive as `3` or, from spreadsheet round-trips, `3.0`.
fn parse_trade_mode(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}
