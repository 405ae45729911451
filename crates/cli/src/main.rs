use anyhow::Context;
use clap::Parser;
use coinfolio_core::models::coin::CoinStub;
use coinfolio_core::models::holding::HoldingId;
use coinfolio_core::models::portfolio::PortfolioId;
use coinfolio_core::models::settings::Settings;
use coinfolio_core::views::market_table::SortDirection;
use coinfolio_core::Coinfolio;
use tracing::debug;

use crate::cli::{CoinfolioArgs, Command, HoldingCommand, MarketsArgs, PortfolioCommand};
use crate::logging::init_logging;

mod cli;
mod logging;
mod output;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CoinfolioArgs::parse();
    init_logging(args.verbose);

    let settings = load_settings(&args)?;
    debug!(store = %settings.store_path, currency = %settings.vs_currency, "settings loaded");
    let app = Coinfolio::from_settings(settings).context("failed to open portfolio store")?;

    match args.command {
        Command::Markets(markets) => show_markets(&app, markets).await,
        Command::Coin { id } => {
            let detail = app.get_coin_detail(&id).await?;
            let links = app.exchange_links(&detail.symbol);
            output::print_coin_detail(&detail, &links, &app.settings().vs_currency);
            Ok(())
        }
        Command::Search { query } => {
            let hits = app.search_coins(&query).await?;
            output::print_search_hits(&hits, &app.settings().vs_currency);
            Ok(())
        }
        Command::Portfolio(cmd) => run_portfolio(&app, cmd).await,
        Command::Holding(cmd) => run_holding(&app, cmd).await,
    }
}

/// Defaults, then the config file, then the environment, then flags.
fn load_settings(args: &CoinfolioArgs) -> anyhow::Result<Settings> {
    let settings = match &args.config {
        Some(path) => Settings::load_from_file(path)
            .with_context(|| format!("failed to read settings from {path}"))?,
        None => Settings::default(),
    };
    let settings = settings.apply_env(|key| std::env::var(key).ok())?;

    // Flags reuse the environment override path so they get the same validation.
    let settings = settings.apply_env(|key| match key {
        "COINFOLIO_STORE" => args.store.clone(),
        "COINFOLIO_VS_CURRENCY" => args.currency.clone(),
        _ => None,
    })?;
    Ok(settings)
}

async fn show_markets(app: &Coinfolio, args: MarketsArgs) -> anyhow::Result<()> {
    let sort = args.sort.map(|key| {
        let direction = if args.asc {
            SortDirection::Ascending
        } else if args.desc {
            SortDirection::Descending
        } else {
            key.default_direction()
        };
        (key, direction)
    });
    let table = app.market_table(args.page, sort).await?;
    output::print_market_table(&table, &app.settings().vs_currency);
    Ok(())
}

async fn run_portfolio(app: &Coinfolio, cmd: PortfolioCommand) -> anyhow::Result<()> {
    match cmd {
        PortfolioCommand::List => {
            let view = app.portfolio_list_view()?;
            output::print_portfolio_rows(&view.rows());
        }
        PortfolioCommand::Create { name, emoji } => {
            let id = app.create_portfolio(&name, &emoji)?;
            println!("Created portfolio {id}");
        }
        PortfolioCommand::Delete { id } => {
            let removed = app.delete_portfolio(PortfolioId(id))?;
            println!("Deleted portfolio {id} and {removed} holding(s)");
        }
        PortfolioCommand::Show { id } => {
            let view = app.portfolio_detail_view(PortfolioId(id))?;
            let valuation = view.valuation(app).await?;
            output::print_valuation(&valuation);
        }
    }
    Ok(())
}

async fn run_holding(app: &Coinfolio, cmd: HoldingCommand) -> anyhow::Result<()> {
    match cmd {
        HoldingCommand::Add {
            portfolio,
            coin,
            amount,
        } => {
            let detail = app
                .get_coin_detail(&coin)
                .await
                .with_context(|| format!("failed to look up coin '{coin}'"))?;
            let stub = CoinStub {
                id: detail.id,
                name: detail.name,
                symbol: detail.symbol,
                market_cap_rank: detail.market_cap_rank,
                thumb: detail.image,
            };
            let id = app.add_holding_from_search(PortfolioId(portfolio), &stub, &amount)?;
            println!("Added holding {id}");
        }
        HoldingCommand::Remove { id } => {
            if app.delete_holding(HoldingId(id))? {
                println!("Removed holding {id}");
            } else {
                println!("No holding with id {id}");
            }
        }
    }
    Ok(())
}
