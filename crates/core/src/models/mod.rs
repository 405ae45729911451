pub mod coin;
pub mod holding;
pub mod portfolio;
pub mod settings;
pub mod valuation;
