pub mod exchange_links;
pub mod forms;
pub mod market_table;
pub mod portfolio;
pub mod search;
