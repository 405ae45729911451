use std::cmp::Ordering;
use std::str::FromStr;

use crate::errors::CoreError;
use crate::format;
use crate::models::coin::CoinSummary;

/// Sortable columns of the market list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Rank,
    Price,
    Change1h,
    Change24h,
    Change7d,
    MarketCap,
    CirculatingSupply,
}

impl SortKey {
    /// Direction used when a column is first selected: rank ascending,
    /// everything else largest first.
    pub fn default_direction(self) -> SortDirection {
        match self {
            SortKey::Rank => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }

    fn value(self, coin: &CoinSummary) -> Option<f64> {
        match self {
            SortKey::Rank => coin.market_cap_rank.map(f64::from),
            SortKey::Price => coin.current_price,
            SortKey::Change1h => coin.change_1h,
            SortKey::Change24h => coin.change_24h,
            SortKey::Change7d => coin.change_7d,
            SortKey::MarketCap => coin.market_cap,
            SortKey::CirculatingSupply => coin.circulating_supply,
        }
        .filter(|v| !v.is_nan())
    }
}

impl FromStr for SortKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rank" => Ok(SortKey::Rank),
            "price" => Ok(SortKey::Price),
            "1h" | "change1h" => Ok(SortKey::Change1h),
            "24h" | "change24h" => Ok(SortKey::Change24h),
            "7d" | "change7d" => Ok(SortKey::Change7d),
            "mcap" | "marketcap" | "market_cap" => Ok(SortKey::MarketCap),
            "supply" | "circulating_supply" => Ok(SortKey::CirculatingSupply),
            other => Err(CoreError::ValidationError(format!(
                "Unknown sort column '{other}' (expected rank, price, 1h, 24h, 7d, mcap or supply)"
            ))),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Rank => write!(f, "rank"),
            SortKey::Price => write!(f, "price"),
            SortKey::Change1h => write!(f, "1h"),
            SortKey::Change24h => write!(f, "24h"),
            SortKey::Change7d => write!(f, "7d"),
            SortKey::MarketCap => write!(f, "mcap"),
            SortKey::CirculatingSupply => write!(f, "supply"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Stable sort of market rows. Equal values keep their input order and
/// unknown values go last in both directions.
pub fn sort_coins(coins: &mut [CoinSummary], key: SortKey, direction: SortDirection) {
    coins.sort_by(|a, b| compare(key.value(a), key.value(b), direction));
}

fn compare(a: Option<f64>, b: Option<f64>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// One market row ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketRow {
    pub rank: String,
    pub name: String,
    pub symbol: String,
    pub price: String,
    pub change_1h: String,
    pub change_24h: String,
    pub change_7d: String,
    pub market_cap: String,
    pub circulating_supply: String,
}

/// The coin list with its current sort state.
///
/// Sorting always starts again from the rows as fetched, so ties fall back
/// to the upstream (market-cap) order no matter how often the user clicks.
#[derive(Debug, Clone)]
pub struct MarketTable {
    original: Vec<CoinSummary>,
    rows: Vec<CoinSummary>,
    sort: Option<(SortKey, SortDirection)>,
}

impl MarketTable {
    pub fn new(coins: Vec<CoinSummary>) -> Self {
        Self {
            rows: coins.clone(),
            original: coins,
            sort: None,
        }
    }

    pub fn rows(&self) -> &[CoinSummary] {
        &self.rows
    }

    pub fn sort(&self) -> Option<(SortKey, SortDirection)> {
        self.sort
    }

    pub fn sort_by(&mut self, key: SortKey, direction: SortDirection) {
        self.rows = self.original.clone();
        sort_coins(&mut self.rows, key, direction);
        self.sort = Some((key, direction));
    }

    /// Column-header click: the active column flips direction, a new column
    /// starts in its default direction.
    pub fn toggle(&mut self, key: SortKey) {
        let direction = match self.sort {
            Some((current, dir)) if current == key => dir.flipped(),
            _ => key.default_direction(),
        };
        self.sort_by(key, direction);
    }

    /// Formatted rows in the current order.
    pub fn display_rows(&self, vs_currency: &str) -> Vec<MarketRow> {
        self.rows
            .iter()
            .map(|c| MarketRow {
                rank: c
                    .market_cap_rank
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| format::UNKNOWN.to_string()),
                name: c.name.clone(),
                symbol: c.symbol.to_uppercase(),
                price: format::format_price(c.current_price, vs_currency),
                change_1h: format::format_percent(c.change_1h),
                change_24h: format::format_percent(c.change_24h),
                change_7d: format::format_percent(c.change_7d),
                market_cap: format::format_large_number(c.market_cap),
                circulating_supply: format::format_large_number(c.circulating_supply),
            })
            .collect()
    }
}
