use crate::errors::CoreError;
use crate::models::coin::CoinStub;
use crate::models::portfolio::PortfolioId;

/// Emoji used when the create-portfolio form leaves it blank.
pub const FALLBACK_EMOJI: &str = "📁";

/// Input of the create-portfolio dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPortfolio {
    pub name: String,
    pub emoji: String,
}

impl NewPortfolio {
    pub fn new(name: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emoji: emoji.into(),
        }
    }

    /// Trim the fields and reject an empty name. Runs before any store call.
    pub fn validate(self) -> Result<Self, CoreError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::ValidationError("Portfolio name is required".into()));
        }
        let emoji = match self.emoji.trim() {
            "" => FALLBACK_EMOJI.to_string(),
            e => e.to_string(),
        };
        Ok(Self { name, emoji })
    }
}

/// Input of the add-holding dialog: a coin picked from search plus a
/// quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHolding {
    pub portfolio_id: PortfolioId,
    pub coin_id: String,
    pub coin_symbol: String,
    pub coin_name: String,
    pub amount: f64,
}

impl NewHolding {
    /// Build from a search result and the raw quantity text the user typed.
    pub fn from_input(
        portfolio_id: PortfolioId,
        coin: &CoinStub,
        amount_input: &str,
    ) -> Result<Self, CoreError> {
        let trimmed = amount_input.trim();
        if trimmed.is_empty() {
            return Err(CoreError::ValidationError("Amount is required".into()));
        }
        let amount: f64 = trimmed.replace(',', "").parse().map_err(|_| {
            CoreError::ValidationError(format!("Amount '{trimmed}' is not a number"))
        })?;
        Self {
            portfolio_id,
            coin_id: coin.id.clone(),
            coin_symbol: coin.symbol.clone(),
            coin_name: coin.name.clone(),
            amount,
        }
        .validate()
    }

    /// Reject a missing coin and any amount that is negative or not finite.
    /// Zero is a valid quantity. The symbol is kept as received.
    pub fn validate(self) -> Result<Self, CoreError> {
        let coin_id = self.coin_id.trim().to_string();
        if coin_id.is_empty() {
            return Err(CoreError::ValidationError("Select a coin first".into()));
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Amount must be a non-negative number, got {}",
                self.amount
            )));
        }
        let coin_name = match self.coin_name.trim() {
            "" => coin_id.clone(),
            n => n.to_string(),
        };
        Ok(Self {
            portfolio_id: self.portfolio_id,
            coin_symbol: self.coin_symbol.trim().to_string(),
            coin_name,
            coin_id,
            amount: self.amount,
        })
    }
}
