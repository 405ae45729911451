use tracing::warn;

use crate::errors::CoreError;
use crate::models::coin::CoinStub;
use crate::providers::traits::MarketDataProvider;

/// A search result shown in the add-holding dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub coin: CoinStub,

    /// Current price, `None` if it could not be fetched
    pub price: Option<f64>,
}

/// Run a free-text search and attach spot prices to the results.
///
/// The provider caps results before enrichment, so at most one batched
/// price request covers every hit. Enrichment bypasses the portfolio price
/// cache (it would otherwise replace the cached portfolio batch) and its
/// failure only blanks the prices; the search itself still succeeds.
pub async fn search_with_prices(
    provider: &dyn MarketDataProvider,
    query: &str,
) -> Result<Vec<SearchHit>, CoreError> {
    let coins = provider.search_coins(query).await?;
    if coins.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> = coins.iter().map(|c| c.id.clone()).collect();
    let prices = match provider.get_spot_prices(&ids).await {
        Ok(prices) => prices,
        Err(e) => {
            warn!(error = %e, "price enrichment for search results failed");
            Default::default()
        }
    };

    Ok(coins
        .into_iter()
        .map(|coin| SearchHit {
            price: prices.get(&coin.id).copied(),
            coin,
        })
        .collect())
}
