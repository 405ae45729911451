pub mod price_cache;
pub mod valuation_service;
