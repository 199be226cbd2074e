use async_trait::async_trait;
use chrono::NaiveDate;

use crate::portfolio::{Holding, Portfolio};
use crate::price::PriceObservation;
use crate::scope::Scope;
use crate::stock::Stock;
use crate::user::User;

/// Storage-layer failure, propagated to the caller as a single opaque error.
/// Retries, if any, belong to the backing store.
#[derive(Debug)]
pub enum StoreError {
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(details) => write!(f, "Store unavailable: {details}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Read-only query interface over the portfolio data model.
///
/// The aggregation engine never mutates stored data and never keeps ambient
/// state of its own; everything it needs comes through this trait. Scoped
/// reads return empty collections for scopes that match nothing (an unknown
/// username is a valid, empty scope, not an error).
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    async fn users(&self) -> Result<Vec<User>, StoreError>;

    async fn stocks(&self) -> Result<Vec<Stock>, StoreError>;

    /// Portfolios within scope, including ones with zero holdings.
    async fn portfolios(&self, scope: &Scope) -> Result<Vec<Portfolio>, StoreError>;

    async fn holdings(&self, scope: &Scope) -> Result<Vec<Holding>, StoreError>;

    /// The most recent observation per stock.
    async fn latest_prices(&self) -> Result<Vec<PriceObservation>, StoreError>;

    /// All observations on or after `since`, across every stock.
    async fn prices_since(&self, since: NaiveDate) -> Result<Vec<PriceObservation>, StoreError>;
}
