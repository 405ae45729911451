use coinfolio_core::format;
use coinfolio_core::models::coin::CoinDetail;
use coinfolio_core::models::valuation::PortfolioValuation;
use coinfolio_core::views::exchange_links::ExchangeLink;
use coinfolio_core::views::market_table::MarketTable;
use coinfolio_core::views::portfolio::PortfolioRow;
use coinfolio_core::views::search::SearchHit;

pub(crate) fn print_market_table(table: &MarketTable, vs_currency: &str) {
    if let Some((key, direction)) = table.sort() {
        println!("Sorted by {key} ({direction:?})");
    }
    println!(
        "{:>5}  {:<24} {:<8} {:>16} {:>9} {:>9} {:>9} {:>12} {:>12}",
        "#", "Coin", "Symbol", "Price", "1h", "24h", "7d", "Market cap", "Supply"
    );
    for row in table.display_rows(vs_currency) {
        println!(
            "{:>5}  {:<24} {:<8} {:>16} {:>9} {:>9} {:>9} {:>12} {:>12}",
            row.rank,
            row.name,
            row.symbol,
            row.price,
            row.change_1h,
            row.change_24h,
            row.change_7d,
            row.market_cap,
            row.circulating_supply
        );
    }
}

pub(crate) fn print_coin_detail(detail: &CoinDetail, links: &[ExchangeLink], vs_currency: &str) {
    let md = &detail.market_data;
    let rank = detail
        .market_cap_rank
        .map(|r| format!("#{r}"))
        .unwrap_or_else(|| format::UNKNOWN.to_string());

    println!("{} ({})  {rank}", detail.name, detail.symbol.to_uppercase());
    println!(
        "Price        {}  {}",
        format::format_price(md.current_price, vs_currency),
        format::format_percent(md.change_24h)
    );
    println!("Market cap   {}", format::format_money(md.market_cap, vs_currency));
    println!("Volume 24h   {}", format::format_money(md.total_volume, vs_currency));
    println!("High 24h     {}", format::format_price(md.high_24h, vs_currency));
    println!("Low 24h      {}", format::format_price(md.low_24h, vs_currency));
    println!("All-time high {}", format::format_price(md.all_time_high, vs_currency));
    println!(
        "Circulating  {} {}",
        format::format_large_number(md.circulating_supply),
        detail.symbol.to_uppercase()
    );
    println!("Max supply   {}", format::format_large_number(md.max_supply));

    if let Some(homepage) = &detail.links.homepage {
        println!("Website      {homepage}");
    }
    if !links.is_empty() {
        println!();
        println!("Buy {}:", detail.name);
        for link in links {
            println!("  {:<10} {}", link.exchange, link.url);
        }
    }
}

pub(crate) fn print_search_hits(hits: &[SearchHit], vs_currency: &str) {
    if hits.is_empty() {
        println!("No results found");
        return;
    }
    for hit in hits {
        println!(
            "{:<24} {:<8} {:>16}  ({})",
            hit.coin.name,
            hit.coin.symbol.to_uppercase(),
            format::format_price(hit.price, vs_currency),
            hit.coin.id
        );
    }
}

pub(crate) fn print_portfolio_rows(rows: &[PortfolioRow]) {
    if rows.is_empty() {
        println!("No portfolios yet");
        return;
    }
    for row in rows {
        println!(
            "{:>4}  {:<30} {} holding(s)",
            row.portfolio.id,
            row.portfolio.label(),
            row.holding_count
        );
    }
}

pub(crate) fn print_valuation(valuation: &PortfolioValuation) {
    let currency = valuation.currency.as_str();
    println!("{}", valuation.portfolio.label());
    if valuation.upstream_unavailable {
        println!("Price API unavailable; values are unknown");
    }
    println!("Total value  {}", format::format_money(Some(valuation.total_value), currency));
    println!();

    for position in &valuation.positions {
        println!(
            "{:<24} {:>18} {:<8} {:>16} {:>16} {:>7.2}%",
            position.coin_name,
            format::format_amount(position.amount),
            position.coin_symbol.to_uppercase(),
            format::format_price(position.price, currency),
            format::format_money(position.value, currency),
            position.allocation_pct
        );
    }

    if !valuation.holdings.is_empty() {
        println!();
        println!("Records:");
        for record in &valuation.holdings {
            println!(
                "  [{}] {} {} added {}",
                record.holding.id,
                format::format_amount(record.holding.amount),
                record.holding.coin_symbol.to_uppercase(),
                record.holding.added_at.format("%Y-%m-%d %H:%M")
            );
        }
    }
}
