use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::user::UserId;

pub type PortfolioId = Uuid;

/// A named grouping of holdings, owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Portfolio {
    #[schema(value_type = String, format = Uuid)]
    pub id: PortfolioId,
    #[schema(value_type = String, format = Uuid)]
    pub user_id: UserId,
    pub name: String,
    pub description: String,
}

/// A position of one stock within one portfolio.
///
/// The invested amount is always derived from the cost basis and the share
/// count; it is never stored or edited independently.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Holding {
    #[schema(value_type = String, format = Uuid)]
    pub portfolio_id: PortfolioId,
    pub symbol: String,
    /// Quantity held, non-negative
    pub shares_held: f64,
    /// Cost basis per share
    pub average_purchase_price: f64,
}

impl Holding {
    #[must_use]
    pub fn total_invested(&self) -> f64 {
        self.shares_held * self.average_purchase_price
    }
}
