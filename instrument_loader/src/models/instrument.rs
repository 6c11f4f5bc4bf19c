//! Canonical in-memory representation of one row of an instrument export.

use serde::{Deserialize, Serialize};

/// `TradeMode` value marking an instrument as close-only.
pub const CLOSE_ONLY_TRADE_MODE: i64 = 3;

/// A single tradable instrument with its taxonomy and ratio columns.
///
/// Numeric fields are `None` when the cell was missing or not a finite number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Unique key (e.g. "AAPL.US").
    pub symbol: String,
    /// Sector name; exports use "Undefined" when unknown.
    pub sector: String,
    /// Industry name.
    pub industry: String,
    /// Market capitalisation over enterprise value, in percent.
    pub mcap_ev_ratio: Option<f64>,
    /// Value-at-risk of one lot over the ask price.
    pub var_to_ask_ratio: Option<f64>,
    pub ask_price: Option<f64>,
    pub bid_price: Option<f64>,
    /// `(ask - bid) / ask * 100`, when both prices are known and ask is non-zero.
    pub spread_percent: Option<f64>,
    pub trade_mode: Option<i64>,
}

impl Instrument {
    /// Builds an instrument with only taxonomy and MCap/EV set.
    pub fn new(
        symbol: impl Into<String>,
        sector: impl Into<String>,
        industry: impl Into<String>,
        mcap_ev_ratio: Option<f64>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            sector: sector.into(),
            industry: industry.into(),
            mcap_ev_ratio,
            var_to_ask_ratio: None,
            ask_price: None,
            bid_price: None,
            spread_percent: None,
            trade_mode: None,
        }
    }

    pub fn with_var_to_ask(mut self, ratio: Option<f64>) -> Self {
        self.var_to_ask_ratio = ratio;
        self
    }

    pub fn with_trade_mode(mut self, mode: i64) -> Self {
        self.trade_mode = Some(mode);
        self
    }

    /// Sets both prices and derives the spread.
    pub fn with_prices(mut self, ask: Option<f64>, bid: Option<f64>) -> Self {
        self.ask_price = ask;
        self.bid_price = bid;
        self.spread_percent = spread_percent(ask, bid);
        self
    }

    /// True for close-only (non-tradable) instruments.
    pub fn is_close_only(&self) -> bool {
        self.trade_mode == Some(CLOSE_ONLY_TRADE_MODE)
    }
}

/// Spread as a percentage of the ask price.
pub fn spread_percent(ask: Option<f64>, bid: Option<f64>) -> Option<f64> {
    match (ask, bid) {
        (Some(ask), Some(bid)) if ask != 0.0 => {
            let spread = (ask - bid) / ask * 100.0;
            spread.is_finite().then_some(spread)
        }
        _ => None,
    }
}
