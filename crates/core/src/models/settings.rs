use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Public CoinGecko v3 endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Longest accepted spot-price cache window (one day).
pub const MAX_CACHE_TTL_SECS: u64 = 86_400;

/// User-configurable settings.
///
/// Loaded from an optional JSON file, then overridden by `COINFOLIO_*`
/// environment variables. Every field has a default so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fiat unit for every price (CoinGecko `vs_currency`, lowercase).
    pub vs_currency: String,

    /// Base URL of the market-data API, without trailing slash.
    pub api_base_url: String,

    /// Optional CoinGecko demo key, sent as `x-cg-demo-api-key`.
    pub api_key: Option<String>,

    pub request_timeout_secs: u64,

    /// Validity window of the spot-price cache.
    pub cache_ttl_secs: u64,

    /// Location of the local portfolio database.
    pub store_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vs_currency: "usd".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            request_timeout_secs: 30,
            cache_ttl_secs: 300,
            store_path: "coinfolio.db".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validated()
    }

    /// Load settings from a JSON file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Recognised keys: `COINFOLIO_VS_CURRENCY`, `COINFOLIO_API_BASE_URL`,
    /// `COINFOLIO_API_KEY`, `COINFOLIO_TIMEOUT_SECS`, `COINFOLIO_CACHE_TTL_SECS`,
    /// `COINFOLIO_STORE`. Taking a lookup function keeps this testable without
    /// touching the process environment.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("COINFOLIO_VS_CURRENCY") {
            self.vs_currency = v;
        }
        if let Some(v) = lookup("COINFOLIO_API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("COINFOLIO_API_KEY") {
            self.api_key = if v.trim().is_empty() { None } else { Some(v) };
        }
        if let Some(v) = lookup("COINFOLIO_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_secs("COINFOLIO_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("COINFOLIO_CACHE_TTL_SECS") {
            self.cache_ttl_secs = parse_secs("COINFOLIO_CACHE_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("COINFOLIO_STORE") {
            self.store_path = v;
        }
        self.validated()
    }

    /// Normalise and check field values.
    fn validated(mut self) -> Result<Self, CoreError> {
        let currency = self.vs_currency.trim().to_lowercase();
        if currency.is_empty() || !currency.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::ValidationError(format!(
                "Invalid vs_currency '{}': expected an alphanumeric code such as usd",
                self.vs_currency
            )));
        }
        self.vs_currency = currency;
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        if self.api_base_url.is_empty() {
            return Err(CoreError::ValidationError("api_base_url must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::ValidationError(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        if self.cache_ttl_secs == 0 || self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(CoreError::ValidationError(format!(
                "cache_ttl_secs must be between 1 and {MAX_CACHE_TTL_SECS}, got {}",
                self.cache_ttl_secs
            )));
        }
        Ok(self)
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64, CoreError> {
    value.trim().parse().map_err(|e| {
        CoreError::ValidationError(format!("{key} must be a whole number of seconds: {e}"))
    })
}
