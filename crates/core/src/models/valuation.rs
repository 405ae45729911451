use serde::{Deserialize, Serialize};

use super::holding::Holding;
use super::portfolio::Portfolio;

/// Value of a portfolio computed from its holdings and the latest spot prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValuation {
    pub portfolio: Portfolio,

    /// Fiat unit used for all monetary values
    pub currency: String,

    /// Sum of every priced holding
    pub total_value: f64,

    /// One entry per holding record, in insertion order
    pub holdings: Vec<HoldingValuation>,

    /// Holdings aggregated per coin id, largest value first
    pub positions: Vec<CoinPosition>,

    /// Set when there were holdings to value but no prices at all came
    /// back (upstream down and no usable cache).
    pub upstream_unavailable: bool,
}

/// A single holding record together with its price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingValuation {
    pub holding: Holding,

    /// `None` when the price of this coin is unknown
    pub price: Option<f64>,
    pub value: Option<f64>,
}

/// Every holding of the same coin summed up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinPosition {
    pub coin_id: String,
    pub coin_symbol: String,
    pub coin_name: String,

    /// Total quantity over all records of this coin
    pub amount: f64,

    pub price: Option<f64>,
    pub value: Option<f64>,

    /// Share of `total_value` in percent (0 when the total is 0 or unknown)
    pub allocation_pct: f64,
}
