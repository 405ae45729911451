use serde::{Deserialize, Serialize};

/// One row of the market listing (`/coins/markets`).
///
/// Change percentages and most magnitudes are `Option`: CoinGecko omits or
/// nulls them for thinly traded coins, and an unknown change must never be
/// rendered as 0%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSummary {
    pub id: String,
    pub symbol: String,
    pub name: String,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub market_cap_rank: Option<u32>,

    #[serde(default)]
    pub current_price: Option<f64>,

    #[serde(default)]
    pub market_cap: Option<f64>,

    #[serde(default)]
    pub total_volume: Option<f64>,

    #[serde(default)]
    pub circulating_supply: Option<f64>,

    #[serde(default, rename = "price_change_percentage_1h_in_currency")]
    pub change_1h: Option<f64>,

    #[serde(default, rename = "price_change_percentage_24h_in_currency")]
    pub change_24h: Option<f64>,

    #[serde(default, rename = "price_change_percentage_7d_in_currency")]
    pub change_7d: Option<f64>,
}

/// Minimal coin reference returned by free-text search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinStub {
    pub id: String,
    pub name: String,
    pub symbol: String,

    #[serde(default)]
    pub market_cap_rank: Option<u32>,

    #[serde(default)]
    pub thumb: Option<String>,
}

/// Market figures of a single coin, already resolved to the configured
/// fiat unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinMarketData {
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub all_time_high: Option<f64>,
    pub change_1h: Option<f64>,
    pub change_24h: Option<f64>,
    pub change_7d: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub max_supply: Option<f64>,
}

/// Project links shown on the detail page. Empty strings from the API are
/// dropped while mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinLinks {
    pub homepage: Option<String>,
    pub twitter: Option<String>,
    pub subreddit: Option<String>,
    pub github: Vec<String>,
    pub explorers: Vec<String>,
}

/// Full detail of a single coin (`/coins/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: Option<String>,
    pub market_cap_rank: Option<u32>,

    /// English description; may contain HTML anchors as delivered upstream
    pub description: Option<String>,

    pub market_data: CoinMarketData,
    pub links: CoinLinks,
}
