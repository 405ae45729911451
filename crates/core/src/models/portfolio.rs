use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a portfolio. Assigned by the store on creation, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortfolioId(pub u64);

impl std::fmt::Display for PortfolioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named, user-created grouping of holdings.
///
/// Never updated in place: the only lifecycle events are creation and
/// deletion (which cascades to the portfolio's holdings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: PortfolioId,

    /// Display name, e.g. "Main" (non-empty when created through the facade)
    pub name: String,

    /// Display emoji, e.g. "💰"
    pub emoji: String,

    pub created_at: DateTime<Utc>,
}

impl Portfolio {
    /// Name and emoji of the portfolio created by the legacy migration.
    pub const DEFAULT_NAME: &'static str = "My Portfolio";
    pub const DEFAULT_EMOJI: &'static str = "💰";

    /// Label used by list views, e.g. "💰 Main".
    pub fn label(&self) -> String {
        if self.emoji.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.emoji, self.name)
        }
    }
}
