use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::holding::{Holding, HoldingId, LegacyHolding};
use crate::models::portfolio::{Portfolio, PortfolioId};

/// Which of the two collections a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Portfolios,
    Holdings,
}

/// The current-generation store image: explicit portfolios plus holdings.
///
/// Both collections are kept in creation order. Id counters hold the last
/// id handed out, so ids are never reused even after deletes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub portfolios: Vec<Portfolio>,
    pub holdings: Vec<Holding>,
    pub last_portfolio_id: u64,
    pub last_holding_id: u64,
}

/// The legacy-generation image: one implicit portfolio, holdings only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyDatabase {
    pub holdings: Vec<LegacyHolding>,
    pub last_holding_id: u64,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_portfolio(
        &mut self,
        name: String,
        emoji: String,
        created_at: DateTime<Utc>,
    ) -> PortfolioId {
        self.last_portfolio_id += 1;
        let id = PortfolioId(self.last_portfolio_id);
        self.portfolios.push(Portfolio {
            id,
            name,
            emoji,
            created_at,
        });
        id
    }

    /// Remove a portfolio record only. Returns whether it existed.
    pub fn remove_portfolio(&mut self, id: PortfolioId) -> bool {
        let before = self.portfolios.len();
        self.portfolios.retain(|p| p.id != id);
        self.portfolios.len() != before
    }

    #[allow(clippy::too_many_arguments)]
    pub fn insert_holding(
        &mut self,
        portfolio_id: PortfolioId,
        coin_id: String,
        coin_symbol: String,
        coin_name: String,
        amount: f64,
        added_at: DateTime<Utc>,
    ) -> HoldingId {
        self.last_holding_id += 1;
        let id = HoldingId(self.last_holding_id);
        self.holdings.push(Holding {
            id,
            portfolio_id,
            coin_id,
            coin_symbol,
            coin_name,
            amount,
            added_at,
        });
        id
    }

    /// Remove a single holding. Returns whether it existed.
    pub fn remove_holding(&mut self, id: HoldingId) -> bool {
        let before = self.holdings.len();
        self.holdings.retain(|h| h.id != id);
        self.holdings.len() != before
    }

    /// Remove every holding of a portfolio. Returns how many were removed.
    pub fn remove_holdings_for(&mut self, portfolio_id: PortfolioId) -> usize {
        let before = self.holdings.len();
        self.holdings.retain(|h| h.portfolio_id != portfolio_id);
        before - self.holdings.len()
    }

    pub fn portfolio(&self, id: PortfolioId) -> Option<&Portfolio> {
        self.portfolios.iter().find(|p| p.id == id)
    }

    pub fn holdings_for(&self, portfolio_id: PortfolioId) -> Vec<Holding> {
        self.holdings
            .iter()
            .filter(|h| h.portfolio_id == portfolio_id)
            .cloned()
            .collect()
    }

    /// Holdings whose portfolio no longer exists.
    pub fn dangling_holdings(&self) -> Vec<&Holding> {
        self.holdings
            .iter()
            .filter(|h| self.portfolio(h.portfolio_id).is_none())
            .collect()
    }
}

impl LegacyDatabase {
    /// Upgrade to the current generation.
    ///
    /// Creates exactly one default portfolio and attaches every legacy
    /// holding to it. Holding ids are preserved.
    pub fn migrate(self, now: DateTime<Utc>) -> Database {
        let mut db = Database::new();
        let default_id = db.insert_portfolio(
            Portfolio::DEFAULT_NAME.to_string(),
            Portfolio::DEFAULT_EMOJI.to_string(),
            now,
        );

        let max_id = self.holdings.iter().map(|h| h.id.0).max().unwrap_or(0);
        db.last_holding_id = self.last_holding_id.max(max_id);
        db.holdings = self
            .holdings
            .into_iter()
            .map(|h| h.into_holding(default_id))
            .collect();
        db
    }
}
