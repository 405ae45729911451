use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::providers::traits::MarketDataProvider;

/// Shared snapshot of spot prices, coin id → price.
///
/// Cache hits hand out the same `Arc`, so callers can cheaply tell whether
/// anything changed with `Arc::ptr_eq`.
pub type SpotPrices = Arc<HashMap<String, f64>>;

/// Default validity window of the spot-price cache.
pub const DEFAULT_TTL_SECS: i64 = 300;

/// Source of "now" for the cache window.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used to test the validity window.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

struct CacheEntry {
    fetched_at: DateTime<Utc>,
    prices: SpotPrices,
}

/// Short-lived memo in front of the spot-price endpoint.
///
/// Cache strategy:
/// - **Hit**: the entry is younger than the TTL *and* holds every requested id.
/// - **Partial coverage is a full miss**: the whole requested batch is
///   refetched and replaces the entry; missing ids are never fetched alone.
/// - **Fetch failure**: the previous entry is returned if still inside its
///   window, otherwise an empty map. An empty result for a non-empty request
///   means "upstream unavailable" to the caller.
///
/// The async lock is held across the fetch so concurrent callers queue
/// behind one request instead of issuing duplicates.
pub struct PriceCache {
    ttl: Duration,
    clock: Box<dyn Clock>,
    entry: tokio::sync::Mutex<Option<CacheEntry>>,
}

impl PriceCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }

    pub fn with_clock(ttl: Duration, clock: impl Clock + 'static) -> Self {
        Self {
            ttl,
            clock: Box::new(clock),
            entry: tokio::sync::Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Spot prices for `ids`, from cache when possible.
    pub async fn get_spot_prices(
        &self,
        provider: &dyn MarketDataProvider,
        ids: &[String],
    ) -> SpotPrices {
        if ids.is_empty() {
            return Arc::new(HashMap::new());
        }

        let mut entry = self.entry.lock().await;
        let now = self.clock.now();

        if let Some(cached) = entry.as_ref() {
            if self.is_fresh(cached, now) && ids.iter().all(|id| cached.prices.contains_key(id)) {
                debug!(ids = ids.len(), "spot price cache hit");
                return cached.prices.clone();
            }
        }

        debug!(ids = ids.len(), provider = provider.name(), "spot price cache miss");
        match provider.get_spot_prices(ids).await {
            Ok(prices) => {
                let prices: SpotPrices = Arc::new(prices);
                *entry = Some(CacheEntry {
                    fetched_at: self.clock.now(),
                    prices: prices.clone(),
                });
                prices
            }
            Err(e) => match entry.as_ref() {
                Some(cached) if self.is_fresh(cached, now) => {
                    warn!(error = %e, "spot price fetch failed; serving cached prices");
                    cached.prices.clone()
                }
                _ => {
                    warn!(error = %e, "spot price fetch failed and no usable cache");
                    Arc::new(HashMap::new())
                }
            },
        }
    }

    /// When the current entry was fetched, if there is one.
    pub async fn last_fetched(&self) -> Option<DateTime<Utc>> {
        self.entry.lock().await.as_ref().map(|e| e.fetched_at)
    }

    /// Drop the cached entry; the next request always fetches.
    pub async fn clear(&self) {
        *self.entry.lock().await = None;
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.fetched_at < self.ttl
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_TTL_SECS))
    }
}
