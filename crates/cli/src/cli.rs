//! Command-line arguments.
//!
//! Settings resolve in order: defaults, optional JSON config file,
//! `COINFOLIO_*` environment variables, then the flags below.

use clap::{Args, Parser, Subcommand, ValueHint};
use coinfolio_core::views::market_table::SortKey;

/// Coinfolio - crypto market dashboard and local portfolio tracker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CoinfolioArgs {
    /// JSON settings file
    #[arg(long, env = "COINFOLIO_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    /// Portfolio database file (overrides settings)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub store: Option<String>,

    /// Fiat unit for prices, e.g. usd or eur (overrides settings)
    #[arg(long)]
    pub currency: Option<String>,

    /// Debug logging for the core library (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Top coins by market capitalization
    Markets(MarketsArgs),

    /// Detail page of one coin
    Coin {
        /// CoinGecko coin id, e.g. bitcoin
        id: String,
    },

    /// Search coins by name or symbol
    Search {
        query: String,
    },

    /// Manage portfolios
    #[command(subcommand)]
    Portfolio(PortfolioCommand),

    /// Manage holdings
    #[command(subcommand)]
    Holding(HoldingCommand),
}

#[derive(Args, Debug)]
pub struct MarketsArgs {
    /// Page of 100 coins, starting at 1
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Column to sort by: rank, price, 1h, 24h, 7d, mcap, supply
    #[arg(long)]
    pub sort: Option<SortKey>,

    /// Sort ascending (default for rank)
    #[arg(long, conflicts_with = "desc")]
    pub asc: bool,

    /// Sort descending (default for every other column)
    #[arg(long)]
    pub desc: bool,
}

#[derive(Subcommand, Debug)]
pub enum PortfolioCommand {
    /// List portfolios with their holding counts
    List,

    /// Create a portfolio
    Create {
        name: String,

        #[arg(long, default_value = "")]
        emoji: String,
    },

    /// Delete a portfolio and all of its holdings
    Delete {
        id: u64,
    },

    /// Holdings and current value of a portfolio
    Show {
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum HoldingCommand {
    /// Record an amount of a coin in a portfolio
    Add {
        portfolio: u64,

        /// CoinGecko coin id, e.g. bitcoin
        coin: String,

        amount: String,
    },

    /// Remove a holding record
    Remove {
        id: u64,
    },
}
