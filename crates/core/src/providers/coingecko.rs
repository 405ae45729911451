use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::coin::{CoinDetail, CoinLinks, CoinMarketData, CoinStub, CoinSummary};
use crate::models::settings::Settings;
use super::traits::{MarketDataProvider, MARKETS_PAGE_SIZE, SEARCH_RESULT_LIMIT};

const PROVIDER: &str = "CoinGecko";

/// CoinGecko v3 market-data client.
///
/// - **Free**: works without a key; a demo key raises the rate limit.
/// - **Endpoints**: `/coins/markets`, `/coins/{id}`, `/search`, `/simple/price`
///
/// Status mapping: 2xx parses the body, 404 on the detail endpoint is
/// `CoinNotFound`, every other status is `Upstream { status, .. }`.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    vs_currency: String,
}

impl CoinGeckoProvider {
    pub fn new(settings: &Settings) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(settings.request_timeout_secs));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            vs_currency: settings.vs_currency.to_lowercase(),
        }
    }

    pub fn vs_currency(&self) -> &str {
        &self.vs_currency
    }

    /// GET `path` and return the body of a 2xx response.
    async fn get_text(
        &self,
        path: &str,
        query: &[(&str, String)],
        not_found_id: Option<&str>,
    ) -> Result<String, CoreError> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self
            .client
            .get(&url)
            .query(query)
            .header("accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        debug!(path, "requesting market data");
        let resp = request.send().await?;
        check_status(resp.status().as_u16(), path, not_found_id)?;
        Ok(resp.text().await?)
    }

    // ── Response parsing ────────────────────────────────────────────

    /// Parse a `/coins/markets` body.
    pub fn parse_markets(body: &str) -> Result<Vec<CoinSummary>, CoreError> {
        serde_json::from_str(body).map_err(|e| parse_error("market listing", e))
    }

    /// Parse a `/search` body, keeping at most [`SEARCH_RESULT_LIMIT`] coins.
    pub fn parse_search(body: &str) -> Result<Vec<CoinStub>, CoreError> {
        let resp: SearchResponse =
            serde_json::from_str(body).map_err(|e| parse_error("search results", e))?;
        let mut coins = resp.coins;
        coins.truncate(SEARCH_RESULT_LIMIT);
        Ok(coins)
    }

    /// Parse a `/simple/price` body for one fiat unit. Coins without a price
    /// in that unit are left out.
    pub fn parse_simple_prices(
        body: &str,
        vs_currency: &str,
    ) -> Result<HashMap<String, f64>, CoreError> {
        let resp: HashMap<String, HashMap<String, Option<f64>>> =
            serde_json::from_str(body).map_err(|e| parse_error("spot prices", e))?;
        Ok(resp
            .into_iter()
            .filter_map(|(id, prices)| {
                let price = prices.get(vs_currency).copied().flatten()?;
                Some((id, price))
            })
            .collect())
    }

    /// Parse a `/coins/{id}` body, resolving market figures to `vs_currency`.
    pub fn parse_coin_detail(body: &str, vs_currency: &str) -> Result<CoinDetail, CoreError> {
        let raw: RawDetail =
            serde_json::from_str(body).map_err(|e| parse_error("coin detail", e))?;
        Ok(raw.into_detail(vs_currency))
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

/// CoinGecko ids are lowercase slugs such as `bitcoin` or `usd-coin`. Anything
/// else cannot name a coin and must not be spliced into a request path.
pub fn is_valid_coin_id(id: &str) -> bool {
    id.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit())
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
}

/// Map an HTTP status to the error taxonomy.
///
/// `not_found_id` is set for lookups where a 404 means "no such coin"; a 404
/// anywhere else is an upstream failure like any other non-2xx.
pub fn check_status(status: u16, resource: &str, not_found_id: Option<&str>) -> Result<(), CoreError> {
    match (status, not_found_id) {
        (200..=299, _) => Ok(()),
        (404, Some(id)) => Err(CoreError::CoinNotFound(id.to_string())),
        (429, _) => Err(CoreError::Upstream {
            status,
            message: format!("rate limited while requesting {resource}"),
        }),
        _ => Err(CoreError::Upstream {
            status,
            message: format!("request for {resource} failed"),
        }),
    }
}

fn parse_error(what: &str, e: serde_json::Error) -> CoreError {
    CoreError::Api {
        provider: PROVIDER.into(),
        message: format!("Failed to parse {what}: {e}"),
    }
}

// ── CoinGecko API response types ────────────────────────────────────

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<CoinStub>,
}

type CurrencyMap = Option<HashMap<String, Option<f64>>>;

#[derive(Deserialize)]
struct RawDetail {
    id: String,
    symbol: String,
    name: String,
    #[serde(default)]
    image: Option<RawImage>,
    #[serde(default)]
    market_cap_rank: Option<u32>,
    #[serde(default)]
    description: Option<HashMap<String, Option<String>>>,
    #[serde(default)]
    market_data: Option<RawMarketData>,
    #[serde(default)]
    links: Option<RawLinks>,
}

#[derive(Deserialize)]
struct RawImage {
    #[serde(default)]
    large: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawMarketData {
    #[serde(default)]
    current_price: CurrencyMap,
    #[serde(default)]
    market_cap: CurrencyMap,
    #[serde(default)]
    total_volume: CurrencyMap,
    #[serde(default)]
    high_24h: CurrencyMap,
    #[serde(default)]
    low_24h: CurrencyMap,
    #[serde(default)]
    ath: CurrencyMap,
    #[serde(default)]
    price_change_percentage_1h_in_currency: CurrencyMap,
    #[serde(default)]
    price_change_percentage_24h_in_currency: CurrencyMap,
    #[serde(default)]
    price_change_percentage_7d_in_currency: CurrencyMap,
    #[serde(default)]
    circulating_supply: Option<f64>,
    #[serde(default)]
    total_supply: Option<f64>,
    #[serde(default)]
    max_supply: Option<f64>,
}

#[derive(Deserialize, Default)]
struct RawLinks {
    #[serde(default)]
    homepage: Vec<String>,
    #[serde(default)]
    twitter_screen_name: Option<String>,
    #[serde(default)]
    subreddit_url: Option<String>,
    #[serde(default)]
    repos_url: Option<RawRepos>,
    #[serde(default)]
    blockchain_site: Vec<String>,
}

#[derive(Deserialize, Default)]
struct RawRepos {
    #[serde(default)]
    github: Vec<String>,
}

fn pick(map: &CurrencyMap, currency: &str) -> Option<f64> {
    map.as_ref()?.get(currency).copied().flatten()
}

/// CoinGecko pads link lists with empty strings.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl RawDetail {
    fn into_detail(self, currency: &str) -> CoinDetail {
        let md = self.market_data.unwrap_or_default();
        let links = self.links.unwrap_or_default();

        CoinDetail {
            id: self.id,
            symbol: self.symbol,
            name: self.name,
            image: self.image.and_then(|i| i.large),
            market_cap_rank: self.market_cap_rank,
            description: non_empty(self.description.and_then(|mut d| d.remove("en").flatten())),
            market_data: CoinMarketData {
                current_price: pick(&md.current_price, currency),
                market_cap: pick(&md.market_cap, currency),
                total_volume: pick(&md.total_volume, currency),
                high_24h: pick(&md.high_24h, currency),
                low_24h: pick(&md.low_24h, currency),
                all_time_high: pick(&md.ath, currency),
                change_1h: pick(&md.price_change_percentage_1h_in_currency, currency),
                change_24h: pick(&md.price_change_percentage_24h_in_currency, currency),
                change_7d: pick(&md.price_change_percentage_7d_in_currency, currency),
                circulating_supply: md.circulating_supply,
                total_supply: md.total_supply,
                max_supply: md.max_supply,
            },
            links: CoinLinks {
                homepage: links.homepage.into_iter().find(|s| !s.trim().is_empty()),
                twitter: non_empty(links.twitter_screen_name)
                    .map(|handle| format!("https://twitter.com/{handle}")),
                subreddit: non_empty(links.subreddit_url),
                github: links
                    .repos_url
                    .map(|r| r.github)
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|s| !s.trim().is_empty())
                    .collect(),
                explorers: links
                    .blockchain_site
                    .into_iter()
                    .filter(|s| !s.trim().is_empty())
                    .collect(),
            },
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl MarketDataProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn list_markets(&self, page: u32) -> Result<Vec<CoinSummary>, CoreError> {
        let query = [
            ("vs_currency", self.vs_currency.clone()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", MARKETS_PAGE_SIZE.to_string()),
            ("page", page.max(1).to_string()),
            ("sparkline", "false".to_string()),
            ("price_change_percentage", "1h,24h,7d".to_string()),
        ];
        let body = self.get_text("/coins/markets", &query, None).await?;
        Self::parse_markets(&body)
    }

    async fn get_coin_detail(&self, id: &str) -> Result<CoinDetail, CoreError> {
        let id = id.trim().to_lowercase();
        if !is_valid_coin_id(&id) {
            return Err(CoreError::CoinNotFound(id));
        }
        let query = [
            ("localization", "false".to_string()),
            ("tickers", "false".to_string()),
            ("community_data", "false".to_string()),
            ("developer_data", "false".to_string()),
        ];
        let body = self
            .get_text(&format!("/coins/{id}"), &query, Some(&id))
            .await?;
        Self::parse_coin_detail(&body, &self.vs_currency)
    }

    async fn search_coins(&self, query: &str) -> Result<Vec<CoinStub>, CoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let body = self
            .get_text("/search", &[("query", query.to_string())], None)
            .await?;
        Self::parse_search(&body)
    }

    async fn get_spot_prices(&self, ids: &[String]) -> Result<HashMap<String, f64>, CoreError> {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = ids
            .iter()
            .map(|id| id.as_str())
            .filter(|id| !id.is_empty() && seen.insert(*id))
            .collect();
        if unique.is_empty() {
            return Ok(HashMap::new());
        }

        let query = [
            ("ids", unique.join(",")),
            ("vs_currencies", self.vs_currency.clone()),
        ];
        let body = self.get_text("/simple/price", &query, None).await?;
        Self::parse_simple_prices(&body, &self.vs_currency)
    }
}
