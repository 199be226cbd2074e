use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::engine::{
    self, EnrichedHolding, PerformancePoint, PortfolioOverview, PortfolioSummary, SectorAllocation,
    TopPerformer,
};
use crate::price::PriceBook;
use crate::scope::{Period, Scope};
use crate::store::{PortfolioStore, StoreError};
use crate::user::User;

pub const DEFAULT_TOP_PERFORMERS_LIMIT: usize = 10;

/// The aggregation engine's entry point: fetches scoped reads from the
/// store, joins them, and derives metrics at request time. Holds no state of
/// its own beyond the store handle, so concurrent requests are independent.
pub struct Tracker {
    store: Arc<dyn PortfolioStore>,
}

impl Tracker {
    #[must_use]
    pub fn new(store: Arc<dyn PortfolioStore>) -> Self {
        Tracker { store }
    }

    /// All provisioned users.
    pub async fn users(&self) -> Result<Vec<User>, StoreError> {
        self.store.users().await
    }

    /// Aggregate metrics for the scope. Per-user aggregation summed across
    /// users when the scope is `All`.
    pub async fn portfolio_summary(&self, scope: &Scope) -> Result<PortfolioSummary, StoreError> {
        let enriched = self.enriched_holdings(scope).await?;
        let portfolios = self.store.portfolios(scope).await?;
        let users = self.store.users().await?;

        let summary = engine::summarize(scope, &enriched, &portfolios, &users);
        debug!(?scope, total_current_value = summary.total_current_value, "Computed summary");
        Ok(summary)
    }

    /// Holdings in scope, enriched with reference data and latest prices,
    /// largest market value first.
    pub async fn holdings(&self, scope: &Scope) -> Result<Vec<EnrichedHolding>, StoreError> {
        self.enriched_holdings(scope).await
    }

    /// Per-portfolio totals in scope, most valuable first.
    pub async fn portfolios(&self, scope: &Scope) -> Result<Vec<PortfolioOverview>, StoreError> {
        let enriched = self.enriched_holdings(scope).await?;
        let portfolios = self.store.portfolios(scope).await?;
        let users = self.store.users().await?;
        Ok(engine::portfolio_overviews(&portfolios, &users, &enriched))
    }

    /// Market value per sector in scope, with each sector's weight.
    pub async fn sector_allocation(
        &self,
        scope: &Scope,
    ) -> Result<Vec<SectorAllocation>, StoreError> {
        let enriched = self.enriched_holdings(scope).await?;
        Ok(engine::sector_allocation(&enriched))
    }

    /// Best returning symbols across all holdings, regardless of scope.
    pub async fn top_performers(&self, limit: usize) -> Result<Vec<TopPerformer>, StoreError> {
        let enriched = self.enriched_holdings(&Scope::All).await?;
        Ok(engine::top_performers(&enriched, limit))
    }

    /// Value of the scope's holdings across the trailing window, one point
    /// per observation date.
    pub async fn performance(
        &self,
        scope: &Scope,
        period: Period,
    ) -> Result<Vec<PerformancePoint>, StoreError> {
        let since = period.window_start(Utc::now().date_naive());
        let holdings = self.store.holdings(scope).await?;
        let observations = self.store.prices_since(since).await?;
        debug!(?scope, ?period, %since, observations = observations.len(), "Computed performance window");
        Ok(engine::performance_series(&holdings, &observations))
    }

    async fn enriched_holdings(&self, scope: &Scope) -> Result<Vec<EnrichedHolding>, StoreError> {
        let holdings = self.store.holdings(scope).await?;
        let portfolios = self.store.portfolios(scope).await?;
        let users = self.store.users().await?;
        let stocks = self.store.stocks().await?;
        let prices = PriceBook::from_observations(self.store.latest_prices().await?);
        Ok(engine::enrich_holdings(
            &holdings,
            &portfolios,
            &users,
            &stocks,
            &prices,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use uuid::Uuid;

    use crate::portfolio::{Holding, Portfolio};
    use crate::price::PriceObservation;
    use crate::stock::{Exchange, MarketCap, Stock};

    /// Minimal store over fixed vectors, enough to drive the facade.
    struct FixtureStore {
        users: Vec<User>,
        stocks: Vec<Stock>,
        portfolios: Vec<Portfolio>,
        holdings: Vec<Holding>,
        prices: Vec<PriceObservation>,
    }

    impl FixtureStore {
        fn user_id(&self, username: &str) -> Option<Uuid> {
            self.users
                .iter()
                .find(|u| u.username == username)
                .map(|u| u.id)
        }

        fn portfolio_ids(&self, scope: &Scope) -> Vec<Uuid> {
            match scope {
                Scope::All => self.portfolios.iter().map(|p| p.id).collect(),
                Scope::User(username) => match self.user_id(username) {
                    Some(user_id) => self
                        .portfolios
                        .iter()
                        .filter(|p| p.user_id == user_id)
                        .map(|p| p.id)
                        .collect(),
                    None => Vec::new(),
                },
                Scope::Portfolio(id) => self
                    .portfolios
                    .iter()
                    .filter(|p| p.id == *id)
                    .map(|p| p.id)
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl PortfolioStore for FixtureStore {
        async fn users(&self) -> Result<Vec<User>, StoreError> {
            Ok(self.users.clone())
        }

        async fn stocks(&self) -> Result<Vec<Stock>, StoreError> {
            Ok(self.stocks.clone())
        }

        async fn portfolios(&self, scope: &Scope) -> Result<Vec<Portfolio>, StoreError> {
            let ids = self.portfolio_ids(scope);
            Ok(self
                .portfolios
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect())
        }

        async fn holdings(&self, scope: &Scope) -> Result<Vec<Holding>, StoreError> {
            let ids = self.portfolio_ids(scope);
            Ok(self
                .holdings
                .iter()
                .filter(|h| ids.contains(&h.portfolio_id))
                .cloned()
                .collect())
        }

        async fn latest_prices(&self) -> Result<Vec<PriceObservation>, StoreError> {
            Ok(self.prices.clone())
        }

        async fn prices_since(&self, since: NaiveDate) -> Result<Vec<PriceObservation>, StoreError> {
            Ok(self
                .prices
                .iter()
                .filter(|p| p.price_date >= since)
                .cloned()
                .collect())
        }
    }

    fn tracker() -> Tracker {
        let user = User {
            id: Uuid::new_v4(),
            username: "raj_investor".to_string(),
            email: "raj@example.in".to_string(),
            first_name: "Raj".to_string(),
            last_name: "Patel".to_string(),
            pan_number: "ABCDE1234F".to_string(),
            phone_number: "+91-9876543210".to_string(),
            city: "Mumbai".to_string(),
            state: "Maharashtra".to_string(),
        };
        let portfolio = Portfolio {
            id: Uuid::new_v4(),
            user_id: user.id,
            name: "Tech Focus Portfolio".to_string(),
            description: "Technology picks".to_string(),
        };
        let store = FixtureStore {
            holdings: vec![Holding {
                portfolio_id: portfolio.id,
                symbol: "TCS".to_string(),
                shares_held: 50.0,
                average_purchase_price: 4100.00,
            }],
            portfolios: vec![portfolio],
            users: vec![user],
            stocks: vec![Stock {
                symbol: "TCS".to_string(),
                company_name: "Tata Consultancy Services Limited".to_string(),
                sector: "Information Technology".to_string(),
                exchange: Exchange::Nse,
                market_cap_category: MarketCap::Large,
            }],
            prices: vec![PriceObservation {
                symbol: "TCS".to_string(),
                price_date: Utc::now().date_naive(),
                close_price: 4165.30,
            }],
        };
        Tracker::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_summary_through_store() {
        let tracker = tracker();
        let summary = tracker
            .portfolio_summary(&Scope::User("raj_investor".to_string()))
            .await
            .unwrap();

        assert_eq!(summary.username.as_deref(), Some("raj_investor"));
        assert_eq!(summary.total_portfolios, 1);
        assert!((summary.total_invested - 205_000.00).abs() < 1e-6);
        assert!((summary.total_current_value - 208_265.00).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_unknown_scope_yields_empty_results() {
        let tracker = tracker();
        let scope = Scope::User("nobody".to_string());

        assert!(tracker.holdings(&scope).await.unwrap().is_empty());
        assert!(tracker.portfolios(&scope).await.unwrap().is_empty());
        assert!(tracker.sector_allocation(&scope).await.unwrap().is_empty());

        let summary = tracker.portfolio_summary(&scope).await.unwrap();
        assert_eq!(summary.total_portfolios, 0);
        assert!((summary.unrealized_pl_pct).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_performance_uses_trailing_window() {
        let tracker = tracker();
        let series = tracker
            .performance(&Scope::All, Period::ThreeMonths)
            .await
            .unwrap();
        assert_eq!(series.len(), 1);
        assert!((series[0].portfolio_value - 208_265.00).abs() < 1e-6);
    }
}
