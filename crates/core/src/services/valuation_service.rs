use std::collections::HashMap;

use crate::models::holding::Holding;
use crate::models::portfolio::Portfolio;
use crate::models::valuation::{CoinPosition, HoldingValuation, PortfolioValuation};

/// Computes portfolio value from holdings and a spot-price snapshot.
///
/// Pure business logic, no I/O. Holdings whose coin has no
/// price are kept with `value: None` and excluded from the total.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    pub fn value_portfolio(
        &self,
        portfolio: &Portfolio,
        holdings: &[Holding],
        prices: &HashMap<String, f64>,
        currency: &str,
    ) -> PortfolioValuation {
        let valued: Vec<HoldingValuation> = holdings
            .iter()
            .map(|h| {
                let price = prices.get(&h.coin_id).copied();
                HoldingValuation {
                    holding: h.clone(),
                    price,
                    value: price.map(|p| p * h.amount),
                }
            })
            .collect();

        let total_value: f64 = valued.iter().filter_map(|v| v.value).sum();
        let positions = self.aggregate_positions(holdings, prices, total_value);

        PortfolioValuation {
            portfolio: portfolio.clone(),
            currency: currency.to_string(),
            total_value,
            holdings: valued,
            positions,
            upstream_unavailable: !holdings.is_empty() && prices.is_empty(),
        }
    }

    /// Sum all records of the same coin. Ordered by value (largest first),
    /// unpriced coins last, ties in first-seen order.
    fn aggregate_positions(
        &self,
        holdings: &[Holding],
        prices: &HashMap<String, f64>,
        total_value: f64,
    ) -> Vec<CoinPosition> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut positions: Vec<CoinPosition> = Vec::new();

        for h in holdings {
            match index.get(h.coin_id.as_str()) {
                Some(&i) => positions[i].amount += h.amount,
                None => {
                    index.insert(h.coin_id.as_str(), positions.len());
                    positions.push(CoinPosition {
                        coin_id: h.coin_id.clone(),
                        coin_symbol: h.coin_symbol.clone(),
                        coin_name: h.coin_name.clone(),
                        amount: h.amount,
                        price: prices.get(&h.coin_id).copied(),
                        value: None,
                        allocation_pct: 0.0,
                    });
                }
            }
        }

        for p in &mut positions {
            p.value = p.price.map(|price| price * p.amount);
            if total_value > 0.0 {
                p.allocation_pct = p.value.unwrap_or(0.0) / total_value * 100.0;
            }
        }

        positions.sort_by(|a, b| match (a.value, b.value) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        positions
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
