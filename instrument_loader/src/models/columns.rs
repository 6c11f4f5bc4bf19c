//! Header names of the instrument export.

pub const SYMBOL: &str = "Symbol";
pub const SECTOR: &str = "SectorName";
pub const INDUSTRY: &str = "IndustryName";
pub const MCAP_EV: &str = "MCap/EV (%)";
pub const TRADE_MODE: &str = "TradeMode";
pub const ASK_PRICE: &str = "AskPrice";
pub const BID_PRICE: &str = "BidPrice";
pub const VAR_TO_ASK: &str = "VaR_to_Ask_Ratio";

/// Columns every export is expected to carry, in report order.
pub const REQUIRED: [&str; 8] = [
    SYMBOL, SECTOR, INDUSTRY, MCAP_EV, TRADE_MODE, ASK_PRICE, BID_PRICE, VAR_TO_ASK,
];

/// Sector literal used by exports for instruments without a taxonomy.
pub const UNDEFINED_SECTOR: &str = "Undefined";
