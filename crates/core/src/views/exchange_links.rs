/// An exchange where a coin can be bought, with a deep link to its market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeLink {
    pub exchange: &'static str,
    pub url: String,
}

/// Exchanges listed on the coin detail page, in display order.
pub const EXCHANGES: [&str; 6] = ["Coinbase", "Binance", "Bybit", "Kraken", "KuCoin", "OKX"];

/// "Buy on" links for a coin symbol. Spot pairs are quoted against USDT.
pub fn exchange_links(symbol: &str) -> Vec<ExchangeLink> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Vec::new();
    }
    let lower = symbol.to_lowercase();
    let upper = symbol.to_uppercase();

    EXCHANGES
        .iter()
        .map(|&exchange| {
            let url = match exchange {
                "Coinbase" => format!("https://www.coinbase.com/price/{lower}"),
                "Binance" => format!("https://www.binance.com/en/trade/{upper}_USDT"),
                "Bybit" => format!("https://www.bybit.com/en-US/trade/spot/{upper}/USDT"),
                "Kraken" => format!("https://www.kraken.com/prices/{lower}"),
                "KuCoin" => format!("https://www.kucoin.com/trade/{upper}-USDT"),
                _ => format!("https://www.okx.com/trade-spot/{lower}-usdt"),
            };
            ExchangeLink { exchange, url }
        })
        .collect()
}
