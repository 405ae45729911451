use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::portfolio::PortfolioId;

/// Identity of a holding. Assigned by the store on insert, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HoldingId(pub u64);

impl std::fmt::Display for HoldingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recorded quantity of one coin attached to one portfolio.
///
/// **Important**: `coin_symbol` and `coin_name` are copies taken when the
/// holding was added. They are not kept in sync with upstream renames; only
/// `coin_id` is a stable key into the price API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub id: HoldingId,

    /// Owning portfolio
    pub portfolio_id: PortfolioId,

    /// CoinGecko coin id (e.g., "bitcoin")
    pub coin_id: String,

    /// Ticker symbol at insert time (e.g., "BTC")
    pub coin_symbol: String,

    /// Display name at insert time (e.g., "Bitcoin")
    pub coin_name: String,

    /// Quantity held (finite, non-negative)
    pub amount: f64,

    pub added_at: DateTime<Utc>,
}

/// A holding as stored by the legacy single-portfolio layout.
/// Identical to [`Holding`] minus the portfolio reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyHolding {
    pub id: HoldingId,
    pub coin_id: String,
    pub coin_symbol: String,
    pub coin_name: String,
    pub amount: f64,
    pub added_at: DateTime<Utc>,
}

impl LegacyHolding {
    /// Attach this holding to a portfolio, keeping its identity.
    pub fn into_holding(self, portfolio_id: PortfolioId) -> Holding {
        Holding {
            id: self.id,
            portfolio_id,
            coin_id: self.coin_id,
            coin_symbol: self.coin_symbol,
            coin_name: self.coin_name,
            amount: self.amount,
            added_at: self.added_at,
        }
    }
}
