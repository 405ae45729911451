// ═══════════════════════════════════════════════════════════════════
// Model Tests — Settings, formatting, forms, market sorting,
// exchange links
// ═══════════════════════════════════════════════════════════════════

use std::collections::HashMap;

use chrono::Utc;
use coinfolio_core::errors::CoreError;
use coinfolio_core::format;
use coinfolio_core::models::coin::{CoinStub, CoinSummary};
use coinfolio_core::models::portfolio::{Portfolio, PortfolioId};
use coinfolio_core::models::settings::{Settings, DEFAULT_API_BASE_URL, MAX_CACHE_TTL_SECS};
use coinfolio_core::views::exchange_links::exchange_links;
use coinfolio_core::views::forms::{NewHolding, NewPortfolio, FALLBACK_EMOJI};
use coinfolio_core::views::market_table::{sort_coins, MarketTable, SortDirection, SortKey};

fn coin(id: &str, rank: Option<u32>, change_24h: Option<f64>) -> CoinSummary {
    CoinSummary {
        id: id.to_string(),
        symbol: id[..3.min(id.len())].to_string(),
        name: id.to_string(),
        image: None,
        market_cap_rank: rank,
        current_price: Some(1.0),
        market_cap: None,
        total_volume: None,
        circulating_supply: None,
        change_1h: None,
        change_24h,
        change_7d: None,
    }
}

fn ids(coins: &[CoinSummary]) -> Vec<&str> {
    coins.iter().map(|c| c.id.as_str()).collect()
}

fn btc_stub() -> CoinStub {
    CoinStub {
        id: "bitcoin".into(),
        name: "Bitcoin".into(),
        symbol: "btc".into(),
        market_cap_rank: Some(1),
        thumb: None,
    }
}

// ═══════════════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.vs_currency, "usd");
        assert_eq!(s.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(s.api_key, None);
        assert_eq!(s.request_timeout_secs, 30);
        assert_eq!(s.cache_ttl_secs, 300);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let s = Settings::from_json(r#"{ "vs_currency": "EUR" }"#).unwrap();
        assert_eq!(s.vs_currency, "eur");
        assert_eq!(s.cache_ttl_secs, 300);
        assert_eq!(s.store_path, "coinfolio.db");
    }

    #[test]
    fn json_trims_trailing_slash() {
        let s = Settings::from_json(r#"{ "api_base_url": "http://localhost:8080/api/" }"#).unwrap();
        assert_eq!(s.api_base_url, "http://localhost:8080/api");
    }

    #[test]
    fn cache_window_bounds() {
        for ttl in ["0", "86401", "10000000000000000"] {
            let err = Settings::default()
                .apply_env(env(&[("COINFOLIO_CACHE_TTL_SECS", ttl)]))
                .unwrap_err();
            assert!(matches!(err, CoreError::ValidationError(_)), "ttl {ttl}");
        }

        let s = Settings::default()
            .apply_env(env(&[("COINFOLIO_CACHE_TTL_SECS", "86400")]))
            .unwrap();
        assert_eq!(s.cache_ttl_secs, MAX_CACHE_TTL_SECS);
    }

    #[test]
    fn json_cache_window_zero_rejected() {
        let err = Settings::from_json(r#"{ "cache_ttl_secs": 0 }"#).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn invalid_currency_rejected() {
        let err = Settings::from_json(r#"{ "vs_currency": "u-s" }"#).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn malformed_json_is_deserialization_error() {
        let err = Settings::from_json("{ nope").unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn env_overrides() {
        let s = Settings::default()
            .apply_env(env(&[
                ("COINFOLIO_VS_CURRENCY", "GBP"),
                ("COINFOLIO_API_KEY", "demo-key"),
                ("COINFOLIO_CACHE_TTL_SECS", "60"),
                ("COINFOLIO_STORE", "/tmp/folio.db"),
            ]))
            .unwrap();
        assert_eq!(s.vs_currency, "gbp");
        assert_eq!(s.api_key.as_deref(), Some("demo-key"));
        assert_eq!(s.cache_ttl_secs, 60);
        assert_eq!(s.store_path, "/tmp/folio.db");
        assert_eq!(s.request_timeout_secs, 30);
    }

    #[test]
    fn blank_api_key_clears_it() {
        let mut base = Settings::default();
        base.api_key = Some("old".into());
        let s = base.apply_env(env(&[("COINFOLIO_API_KEY", "  ")])).unwrap();
        assert_eq!(s.api_key, None);
    }

    #[test]
    fn non_numeric_timeout_rejected() {
        let err = Settings::default()
            .apply_env(env(&[("COINFOLIO_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = Settings::default()
            .apply_env(env(&[("COINFOLIO_TIMEOUT_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn no_env_is_identity() {
        let s = Settings::default().apply_env(|_| None).unwrap();
        assert_eq!(s, Settings::default());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Formatting
// ═══════════════════════════════════════════════════════════════════

mod formatting {
    use super::*;

    #[test]
    fn group_thousands_signed() {
        assert_eq!(format::group_thousands("-1234567.89"), "-1,234,567.89");
        assert_eq!(format::group_thousands("999"), "999");
        assert_eq!(format::group_thousands("1000"), "1,000");
    }

    #[test]
    fn number_never_negative_zero() {
        assert_eq!(format::format_number(-0.001, 2), "0.00");
        assert_eq!(format::format_number(1234.5, 2), "1,234.50");
    }

    #[test]
    fn large_number_suffixes() {
        assert_eq!(format::format_large_number(Some(1_234_000_000.0)), "1.23B");
        assert_eq!(format::format_large_number(Some(5_600_000.0)), "5.60M");
        assert_eq!(format::format_large_number(Some(45_600.0)), "45.60K");
        assert_eq!(format::format_large_number(Some(999.5)), "999.50");
        assert_eq!(format::format_large_number(Some(-2_500_000.0)), "-2.50M");
    }

    #[test]
    fn large_number_promotes_at_unit_boundary() {
        assert_eq!(format::format_large_number(Some(999_999.0)), "1.00M");
    }

    #[test]
    fn large_number_past_billions_keeps_grouping() {
        assert_eq!(format::format_large_number(Some(1_234e9)), "1,234.00B");
    }

    #[test]
    fn unknown_values_render_as_dash() {
        assert_eq!(format::format_large_number(None), format::UNKNOWN);
        assert_eq!(format::format_large_number(Some(f64::NAN)), format::UNKNOWN);
        assert_eq!(format::format_price(None, "usd"), format::UNKNOWN);
        assert_eq!(format::format_percent(None), format::UNKNOWN);
        assert_eq!(format::format_money(Some(f64::INFINITY), "usd"), format::UNKNOWN);
    }

    #[test]
    fn price_precision_follows_magnitude() {
        assert_eq!(format::format_price(Some(67_123.45), "usd"), "$67,123.45");
        assert_eq!(format::format_price(Some(0.5123), "usd"), "$0.5123");
        assert_eq!(format::format_price(Some(0.001234), "usd"), "$0.001234");
        assert_eq!(format::format_price(Some(0.00001234), "usd"), "$0.00001234");
        assert_eq!(format::format_price(Some(0.0), "usd"), "$0.00");
    }

    #[test]
    fn currency_symbols() {
        assert_eq!(format::currency_symbol("EUR"), "€");
        assert_eq!(format::currency_symbol("gbp"), "£");
        assert_eq!(format::currency_symbol("chf"), "CHF ");
        assert_eq!(format::format_money(Some(1234.5), "eur"), "€1,234.50");
    }

    #[test]
    fn percent_sign_handling() {
        assert_eq!(format::format_percent(Some(1.234)), "+1.23%");
        assert_eq!(format::format_percent(Some(-0.5)), "-0.50%");
        assert_eq!(format::format_percent(Some(0.001)), "0.00%");
        assert_eq!(format::format_percent(Some(-0.001)), "0.00%");
    }

    #[test]
    fn amounts_trim_trailing_zeros() {
        assert_eq!(format::format_amount(0.5), "0.5");
        assert_eq!(format::format_amount(1200.0), "1,200");
        assert_eq!(format::format_amount(0.0), "0");
        assert_eq!(format::format_amount(0.12345678), "0.12345678");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Forms
// ═══════════════════════════════════════════════════════════════════

mod forms {
    use super::*;

    #[test]
    fn portfolio_name_trimmed() {
        let form = NewPortfolio::new("  Main ", "💰").validate().unwrap();
        assert_eq!(form.name, "Main");
        assert_eq!(form.emoji, "💰");
    }

    #[test]
    fn empty_portfolio_name_rejected() {
        let err = NewPortfolio::new("   ", "💰").validate().unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn blank_emoji_falls_back() {
        let form = NewPortfolio::new("Savings", " ").validate().unwrap();
        assert_eq!(form.emoji, FALLBACK_EMOJI);
    }

    #[test]
    fn holding_from_search_input() {
        let form = NewHolding::from_input(PortfolioId(1), &btc_stub(), " 0.5 ").unwrap();
        assert_eq!(form.coin_id, "bitcoin");
        assert_eq!(form.coin_symbol, "btc");
        assert_eq!(form.coin_name, "Bitcoin");
        assert_eq!(form.amount, 0.5);
    }

    #[test]
    fn holding_amount_accepts_grouping() {
        let form = NewHolding::from_input(PortfolioId(1), &btc_stub(), "1,000").unwrap();
        assert_eq!(form.amount, 1000.0);
    }

    #[test]
    fn holding_amount_rejections() {
        for input in ["", "abc", "-1", "-0.1", "NaN", "inf"] {
            let result = NewHolding::from_input(PortfolioId(1), &btc_stub(), input);
            assert!(
                matches!(result, Err(CoreError::ValidationError(_))),
                "input {input:?} should be rejected"
            );
        }
    }

    #[test]
    fn holding_amount_zero_accepted() {
        let form = NewHolding::from_input(PortfolioId(1), &btc_stub(), "0").unwrap();
        assert_eq!(form.amount, 0.0);
    }

    #[test]
    fn holding_amount_negative_or_nan_rejected() {
        for amount in [-0.1, f64::NAN, f64::INFINITY] {
            let result = NewHolding {
                portfolio_id: PortfolioId(1),
                coin_id: "bitcoin".into(),
                coin_symbol: "btc".into(),
                coin_name: "Bitcoin".into(),
                amount,
            }
            .validate();
            assert!(
                matches!(result, Err(CoreError::ValidationError(_))),
                "amount {amount} should be rejected"
            );
        }
    }

    #[test]
    fn holding_requires_coin() {
        let err = NewHolding {
            portfolio_id: PortfolioId(1),
            coin_id: " ".into(),
            coin_symbol: String::new(),
            coin_name: String::new(),
            amount: 1.0,
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn holding_name_defaults_to_id() {
        let form = NewHolding {
            portfolio_id: PortfolioId(1),
            coin_id: "dogecoin".into(),
            coin_symbol: "doge".into(),
            coin_name: String::new(),
            amount: 10.0,
        }
        .validate()
        .unwrap();
        assert_eq!(form.coin_name, "dogecoin");
        assert_eq!(form.coin_symbol, "doge");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Market table sorting
// ═══════════════════════════════════════════════════════════════════

mod market_sorting {
    use super::*;

    #[test]
    fn ties_keep_input_order() {
        let mut coins = vec![
            coin("alpha", Some(1), Some(2.0)),
            coin("bravo", Some(2), Some(5.0)),
            coin("charlie", Some(3), Some(2.0)),
            coin("delta", Some(4), Some(2.0)),
        ];
        sort_coins(&mut coins, SortKey::Change24h, SortDirection::Descending);
        assert_eq!(ids(&coins), ["bravo", "alpha", "charlie", "delta"]);

        sort_coins(&mut coins, SortKey::Change24h, SortDirection::Ascending);
        assert_eq!(ids(&coins), ["alpha", "charlie", "delta", "bravo"]);
    }

    #[test]
    fn unknown_values_last_in_both_directions() {
        let base = vec![
            coin("alpha", Some(1), None),
            coin("bravo", Some(2), Some(-3.0)),
            coin("charlie", Some(3), Some(4.0)),
        ];

        let mut desc = base.clone();
        sort_coins(&mut desc, SortKey::Change24h, SortDirection::Descending);
        assert_eq!(ids(&desc), ["charlie", "bravo", "alpha"]);

        let mut asc = base;
        sort_coins(&mut asc, SortKey::Change24h, SortDirection::Ascending);
        assert_eq!(ids(&asc), ["bravo", "charlie", "alpha"]);
    }

    #[test]
    fn table_resorts_from_fetched_order() {
        let mut table = MarketTable::new(vec![
            coin("alpha", Some(1), Some(1.0)),
            coin("bravo", Some(2), Some(1.0)),
            coin("charlie", Some(3), Some(9.0)),
        ]);
        table.sort_by(SortKey::Rank, SortDirection::Descending);
        assert_eq!(ids(table.rows()), ["charlie", "bravo", "alpha"]);

        // Ties fall back to the fetched order, not the previous sort.
        table.sort_by(SortKey::Change24h, SortDirection::Ascending);
        assert_eq!(ids(table.rows()), ["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn toggle_flips_active_column() {
        let mut table = MarketTable::new(vec![
            coin("alpha", Some(1), Some(1.0)),
            coin("bravo", Some(2), Some(3.0)),
        ]);
        assert_eq!(table.sort(), None);

        table.toggle(SortKey::Change24h);
        assert_eq!(table.sort(), Some((SortKey::Change24h, SortDirection::Descending)));
        assert_eq!(ids(table.rows()), ["bravo", "alpha"]);

        table.toggle(SortKey::Change24h);
        assert_eq!(table.sort(), Some((SortKey::Change24h, SortDirection::Ascending)));

        table.toggle(SortKey::Rank);
        assert_eq!(table.sort(), Some((SortKey::Rank, SortDirection::Ascending)));
        assert_eq!(ids(table.rows()), ["alpha", "bravo"]);
    }

    #[test]
    fn display_rows_use_placeholders() {
        let table = MarketTable::new(vec![coin("alpha", None, None)]);
        let rows = table.display_rows("usd");
        assert_eq!(rows[0].rank, format::UNKNOWN);
        assert_eq!(rows[0].change_24h, format::UNKNOWN);
        assert_eq!(rows[0].price, "$1.00");
        assert_eq!(rows[0].symbol, "ALP");
    }

    #[test]
    fn sort_key_parsing() {
        assert_eq!("24h".parse::<SortKey>().unwrap(), SortKey::Change24h);
        assert_eq!("MCAP".parse::<SortKey>().unwrap(), SortKey::MarketCap);
        assert_eq!("supply".parse::<SortKey>().unwrap(), SortKey::CirculatingSupply);
        assert!(matches!(
            "volume".parse::<SortKey>(),
            Err(CoreError::ValidationError(_))
        ));
        assert_eq!(SortKey::Change7d.to_string(), "7d");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Portfolio & exchange links
// ═══════════════════════════════════════════════════════════════════

mod misc {
    use super::*;

    #[test]
    fn portfolio_label() {
        let p = Portfolio {
            id: PortfolioId(1),
            name: "Main".into(),
            emoji: "💰".into(),
            created_at: Utc::now(),
        };
        assert_eq!(p.label(), "💰 Main");

        let bare = Portfolio {
            emoji: String::new(),
            ..p
        };
        assert_eq!(bare.label(), "Main");
    }

    #[test]
    fn portfolio_id_serializes_transparently() {
        assert_eq!(serde_json::to_string(&PortfolioId(42)).unwrap(), "42");
    }

    #[test]
    fn exchange_links_for_symbol() {
        let links = exchange_links("btc");
        let names: Vec<&str> = links.iter().map(|l| l.exchange).collect();
        assert_eq!(names, ["Coinbase", "Binance", "Bybit", "Kraken", "KuCoin", "OKX"]);
        assert_eq!(links[0].url, "https://www.coinbase.com/price/btc");
        assert_eq!(links[1].url, "https://www.binance.com/en/trade/BTC_USDT");
        assert_eq!(links[2].url, "https://www.bybit.com/en-US/trade/spot/BTC/USDT");
        assert_eq!(links[5].url, "https://www.okx.com/trade-spot/btc-usdt");
    }

    #[test]
    fn exchange_links_empty_symbol() {
        assert!(exchange_links("  ").is_empty());
    }
}
