pub mod errors;
pub mod format;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;
pub mod views;

use chrono::Duration;
use models::{
    coin::{CoinDetail, CoinStub, CoinSummary},
    holding::{Holding, HoldingId},
    portfolio::{Portfolio, PortfolioId},
    settings::Settings,
    valuation::PortfolioValuation,
};
use providers::traits::MarketDataProvider;
use services::{
    price_cache::{PriceCache, SpotPrices},
    valuation_service::ValuationService,
};
use std::collections::HashSet;
use storage::{
    live::LiveQuery,
    store::{PortfolioStore, StoreStatus},
};
use tracing::warn;
use views::{
    exchange_links::ExchangeLink,
    forms::{NewHolding, NewPortfolio},
    market_table::{MarketTable, SortDirection, SortKey},
    portfolio::{PortfolioDetailView, PortfolioListView},
    search::SearchHit,
};

use errors::CoreError;

/// Main entry point for the Coinfolio core library.
///
/// Owns the local store, the market-data provider and the spot-price cache.
/// The cache lives exactly as long as this value; there is no global state.
#[must_use]
pub struct Coinfolio {
    settings: Settings,
    store: PortfolioStore,
    provider: Box<dyn MarketDataProvider>,
    price_cache: PriceCache,
    valuation_service: ValuationService,
}

impl std::fmt::Debug for Coinfolio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coinfolio")
            .field("provider", &self.provider.name())
            .field("vs_currency", &self.settings.vs_currency)
            .field("store", &self.store)
            .finish()
    }
}

impl Coinfolio {
    /// Compose the app from its parts. The cache window comes from settings;
    /// a window that does not fit a `Duration` is a `ValidationError`.
    pub fn new(
        settings: Settings,
        store: PortfolioStore,
        provider: Box<dyn MarketDataProvider>,
    ) -> Result<Self, CoreError> {
        let ttl = i64::try_from(settings.cache_ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                CoreError::ValidationError(format!(
                    "cache_ttl_secs {} is out of range",
                    settings.cache_ttl_secs
                ))
            })?;
        Ok(Self {
            price_cache: PriceCache::new(ttl),
            settings,
            store,
            provider,
            valuation_service: ValuationService::new(),
        })
    }

    /// Replace the price cache (e.g. one driven by a manual clock).
    pub fn with_price_cache(mut self, cache: PriceCache) -> Self {
        self.price_cache = cache;
        self
    }

    /// Production wiring: file store at `settings.store_path`, CoinGecko
    /// client (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_settings(settings: Settings) -> Result<Self, CoreError> {
        let store = PortfolioStore::open_file(&settings.store_path)?;
        let provider = providers::coingecko::CoinGeckoProvider::new(&settings);
        Self::new(settings, store, Box::new(provider))
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn store(&self) -> &PortfolioStore {
        &self.store
    }

    #[must_use]
    pub fn price_cache(&self) -> &PriceCache {
        &self.price_cache
    }

    // ── Portfolios ──────────────────────────────────────────────────

    /// Create a portfolio. Fails with `ValidationError` on an empty name
    /// without touching the store.
    pub fn create_portfolio(&self, name: &str, emoji: &str) -> Result<PortfolioId, CoreError> {
        let form = NewPortfolio::new(name, emoji).validate()?;
        self.store.create_portfolio(&form.name, &form.emoji)
    }

    /// Delete a portfolio and every holding attached to it.
    /// Returns the number of holdings removed with it.
    pub fn delete_portfolio(&self, id: PortfolioId) -> Result<usize, CoreError> {
        let (existed, removed) = self.store.delete_portfolio_cascade(id)?;
        if !existed {
            return Err(CoreError::PortfolioNotFound(id.0));
        }
        Ok(removed)
    }

    pub fn list_portfolios(&self) -> Result<Vec<Portfolio>, CoreError> {
        self.store.list_portfolios()
    }

    pub fn get_portfolio(&self, id: PortfolioId) -> Result<Portfolio, CoreError> {
        self.store
            .get_portfolio(id)?
            .ok_or(CoreError::PortfolioNotFound(id.0))
    }

    pub fn watch_portfolios(&self) -> Result<LiveQuery<Vec<Portfolio>>, CoreError> {
        self.store.watch_portfolios()
    }

    pub fn portfolio_list_view(&self) -> Result<PortfolioListView, CoreError> {
        PortfolioListView::open(&self.store)
    }

    pub fn portfolio_detail_view(&self, id: PortfolioId) -> Result<PortfolioDetailView, CoreError> {
        PortfolioDetailView::open(&self.store, id)
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// Record a quantity of a coin in a portfolio.
    ///
    /// Validates the input, then checks the portfolio exists so no holding
    /// is ever created pointing nowhere.
    pub fn add_holding(
        &self,
        portfolio_id: PortfolioId,
        coin_id: &str,
        coin_symbol: &str,
        coin_name: &str,
        amount: f64,
    ) -> Result<HoldingId, CoreError> {
        let form = NewHolding {
            portfolio_id,
            coin_id: coin_id.to_string(),
            coin_symbol: coin_symbol.to_string(),
            coin_name: coin_name.to_string(),
            amount,
        }
        .validate()?;
        self.submit_holding(form)
    }

    /// Add-holding dialog submit: a coin picked from search plus the raw
    /// quantity text.
    pub fn add_holding_from_search(
        &self,
        portfolio_id: PortfolioId,
        coin: &CoinStub,
        amount_input: &str,
    ) -> Result<HoldingId, CoreError> {
        let form = NewHolding::from_input(portfolio_id, coin, amount_input)?;
        self.submit_holding(form)
    }

    /// Store an already validated add-holding form.
    pub fn submit_holding(&self, form: NewHolding) -> Result<HoldingId, CoreError> {
        if self.store.get_portfolio(form.portfolio_id)?.is_none() {
            return Err(CoreError::PortfolioNotFound(form.portfolio_id.0));
        }
        self.store.add_holding(
            form.portfolio_id,
            &form.coin_id,
            &form.coin_symbol,
            &form.coin_name,
            form.amount,
        )
    }

    /// Remove one holding. Unknown ids are ignored.
    pub fn delete_holding(&self, id: HoldingId) -> Result<bool, CoreError> {
        self.store.delete_holding(id)
    }

    pub fn list_holdings(&self, portfolio_id: PortfolioId) -> Result<Vec<Holding>, CoreError> {
        self.store.list_holdings(portfolio_id)
    }

    pub fn watch_holdings(
        &self,
        portfolio_id: PortfolioId,
    ) -> Result<LiveQuery<Vec<Holding>>, CoreError> {
        self.store.watch_holdings(portfolio_id)
    }

    // ── Market data ─────────────────────────────────────────────────

    /// One page of the market listing.
    pub async fn list_markets(&self, page: u32) -> Result<Vec<CoinSummary>, CoreError> {
        self.provider.list_markets(page).await
    }

    /// One page of the market listing, sorted for display.
    pub async fn market_table(
        &self,
        page: u32,
        sort: Option<(SortKey, SortDirection)>,
    ) -> Result<MarketTable, CoreError> {
        let mut table = MarketTable::new(self.list_markets(page).await?);
        if let Some((key, direction)) = sort {
            table.sort_by(key, direction);
        }
        Ok(table)
    }

    pub async fn get_coin_detail(&self, id: &str) -> Result<CoinDetail, CoreError> {
        self.provider.get_coin_detail(id).await
    }

    /// "Buy on" links for the detail page of a coin.
    #[must_use]
    pub fn exchange_links(&self, symbol: &str) -> Vec<ExchangeLink> {
        views::exchange_links::exchange_links(symbol)
    }

    /// Search coins for the add-holding dialog, with current prices attached.
    pub async fn search_coins(&self, query: &str) -> Result<Vec<SearchHit>, CoreError> {
        views::search::search_with_prices(self.provider.as_ref(), query).await
    }

    /// Spot prices through the cache. An empty map for a non-empty request
    /// means the upstream is unavailable and nothing usable was cached.
    pub async fn get_spot_prices(&self, ids: &[String]) -> SpotPrices {
        self.price_cache
            .get_spot_prices(self.provider.as_ref(), ids)
            .await
    }

    // ── Valuation ───────────────────────────────────────────────────

    /// Current value of a portfolio, using cached prices when fresh.
    pub async fn portfolio_valuation(
        &self,
        portfolio_id: PortfolioId,
    ) -> Result<PortfolioValuation, CoreError> {
        let portfolio = self.get_portfolio(portfolio_id)?;
        let holdings = self.store.list_holdings(portfolio_id)?;
        Ok(self.value_holdings(&portfolio, &holdings).await)
    }

    /// Value a set of holdings that were already read from the store.
    pub async fn value_holdings(
        &self,
        portfolio: &Portfolio,
        holdings: &[Holding],
    ) -> PortfolioValuation {
        let mut seen = HashSet::new();
        let ids: Vec<String> = holdings
            .iter()
            .filter(|h| seen.insert(h.coin_id.as_str()))
            .map(|h| h.coin_id.clone())
            .collect();

        let prices = self.get_spot_prices(&ids).await;
        let valuation = self.valuation_service.value_portfolio(
            portfolio,
            holdings,
            &prices,
            &self.settings.vs_currency,
        );
        if valuation.upstream_unavailable {
            warn!(portfolio = %portfolio.id, "no prices available for portfolio valuation");
        }
        valuation
    }

    // ── Store handle ────────────────────────────────────────────────

    #[must_use]
    pub fn store_status(&self) -> StoreStatus {
        self.store.status()
    }

    /// Close the store handle; the next operation reopens it.
    pub fn close_store(&self) {
        self.store.close();
    }
}
