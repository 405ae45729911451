use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::coin::{CoinDetail, CoinStub, CoinSummary};

/// Maximum number of search results kept before any enrichment step.
pub const SEARCH_RESULT_LIMIT: usize = 10;

/// Number of coins per market-listing page.
pub const MARKETS_PAGE_SIZE: usize = 100;

/// Trait abstraction for the market-data API.
///
/// The CoinGecko client implements it for production; tests plug in mocks.
/// Prices are always in the one fiat unit the provider was configured with.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// One page (1-based) of top coins by market capitalization, descending.
    async fn list_markets(&self, page: u32) -> Result<Vec<CoinSummary>, CoreError>;

    /// Detail of one coin. Unknown ids fail with `CoreError::CoinNotFound`.
    async fn get_coin_detail(&self, id: &str) -> Result<CoinDetail, CoreError>;

    /// Free-text search, at most [`SEARCH_RESULT_LIMIT`] results.
    async fn search_coins(&self, query: &str) -> Result<Vec<CoinStub>, CoreError>;

    /// Spot prices for a batch of coin ids. Ids the API does not know are
    /// simply absent from the map.
    async fn get_spot_prices(&self, ids: &[String]) -> Result<HashMap<String, f64>, CoreError>;
}
