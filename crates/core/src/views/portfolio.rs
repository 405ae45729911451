use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::portfolio::{Portfolio, PortfolioId};
use crate::models::valuation::PortfolioValuation;
use crate::storage::database::{Collection, Database};
use crate::storage::live::LiveQuery;
use crate::storage::store::PortfolioStore;
use crate::Coinfolio;

/// A portfolio as listed on the overview page.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioRow {
    pub portfolio: Portfolio,
    pub holding_count: usize,
}

fn portfolio_rows(db: &Database) -> Vec<PortfolioRow> {
    db.portfolios
        .iter()
        .map(|p| PortfolioRow {
            portfolio: p.clone(),
            holding_count: db.holdings.iter().filter(|h| h.portfolio_id == p.id).count(),
        })
        .collect()
}

/// Live overview of all portfolios with their holding counts.
/// Refreshes on any portfolio or holding mutation.
#[derive(Debug)]
pub struct PortfolioListView {
    live: LiveQuery<Vec<PortfolioRow>>,
}

impl PortfolioListView {
    pub fn open(store: &PortfolioStore) -> Result<Self, CoreError> {
        let live = store.watch(&[Collection::Portfolios, Collection::Holdings], portfolio_rows)?;
        Ok(Self { live })
    }

    pub fn rows(&self) -> Vec<PortfolioRow> {
        self.live.current()
    }

    pub fn has_changed(&self) -> bool {
        self.live.has_changed()
    }

    /// Wait for the next refresh.
    pub async fn next(&mut self) -> Result<Vec<PortfolioRow>, CoreError> {
        self.live.next().await
    }
}

/// A portfolio together with its holdings, read in one go.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSnapshot {
    pub portfolio: Portfolio,
    pub holdings: Vec<Holding>,
}

/// Live detail page of one portfolio.
///
/// The snapshot becomes `None` once the portfolio is deleted; the page then
/// shows "not found" instead of stale holdings.
#[derive(Debug)]
pub struct PortfolioDetailView {
    portfolio_id: PortfolioId,
    live: LiveQuery<Option<PortfolioSnapshot>>,
}

impl PortfolioDetailView {
    pub fn open(store: &PortfolioStore, portfolio_id: PortfolioId) -> Result<Self, CoreError> {
        let live = store.watch(
            &[Collection::Portfolios, Collection::Holdings],
            move |db: &Database| {
                db.portfolio(portfolio_id).map(|p| PortfolioSnapshot {
                    portfolio: p.clone(),
                    holdings: db.holdings_for(portfolio_id),
                })
            },
        )?;
        if live.current().is_none() {
            return Err(CoreError::PortfolioNotFound(portfolio_id.0));
        }
        Ok(Self { portfolio_id, live })
    }

    pub fn portfolio_id(&self) -> PortfolioId {
        self.portfolio_id
    }

    pub fn snapshot(&self) -> Option<PortfolioSnapshot> {
        self.live.current()
    }

    pub fn has_changed(&self) -> bool {
        self.live.has_changed()
    }

    /// Wait for the next refresh.
    pub async fn next(&mut self) -> Result<Option<PortfolioSnapshot>, CoreError> {
        self.live.next().await
    }

    /// Value the current snapshot with spot prices from the app's cache.
    pub async fn valuation(&self, app: &Coinfolio) -> Result<PortfolioValuation, CoreError> {
        let snapshot = self
            .snapshot()
            .ok_or(CoreError::PortfolioNotFound(self.portfolio_id.0))?;
        Ok(app
            .value_holdings(&snapshot.portfolio, &snapshot.holdings)
            .await)
    }
}
