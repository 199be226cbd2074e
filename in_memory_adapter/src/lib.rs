use std::collections::HashMap;
use std::collections::hash_map::Entry;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use uuid::Uuid;

use domain::portfolio::{Holding, Portfolio, PortfolioId};
use domain::price::PriceObservation;
use domain::scope::Scope;
use domain::stock::{Exchange, MarketCap, Stock};
use domain::store::{PortfolioStore, StoreError};
use domain::user::{User, UserId};

/// Collections-backed `PortfolioStore`. Used by the test suites and as the
/// demo backend when no database is configured.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: Vec<User>,
    stocks: Vec<Stock>,
    portfolios: Vec<Portfolio>,
    holdings: Vec<Holding>,
    prices: Vec<PriceObservation>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(
        &mut self,
        username: &str,
        first_name: &str,
        last_name: &str,
        pan_number: &str,
        city: &str,
        state: &str,
    ) -> UserId {
        let id = Uuid::new_v4();
        self.users.push(User {
            id,
            username: username.to_string(),
            email: format!("{username}@example.in"),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            pan_number: pan_number.to_string(),
            phone_number: "+91-9876543210".to_string(),
            city: city.to_string(),
            state: state.to_string(),
        });
        id
    }

    pub fn add_stock(
        &mut self,
        symbol: &str,
        company_name: &str,
        sector: &str,
        exchange: Exchange,
        market_cap_category: MarketCap,
    ) {
        self.stocks.push(Stock {
            symbol: symbol.to_string(),
            company_name: company_name.to_string(),
            sector: sector.to_string(),
            exchange,
            market_cap_category,
        });
    }

    pub fn add_portfolio(&mut self, user_id: UserId, name: &str, description: &str) -> PortfolioId {
        let id = Uuid::new_v4();
        self.portfolios.push(Portfolio {
            id,
            user_id,
            name: name.to_string(),
            description: description.to_string(),
        });
        id
    }

    pub fn add_holding(
        &mut self,
        portfolio_id: PortfolioId,
        symbol: &str,
        shares_held: f64,
        average_purchase_price: f64,
    ) {
        self.holdings.push(Holding {
            portfolio_id,
            symbol: symbol.to_string(),
            shares_held,
            average_purchase_price,
        });
    }

    pub fn add_price(&mut self, symbol: &str, price_date: NaiveDate, close_price: f64) {
        self.prices.push(PriceObservation {
            symbol: symbol.to_string(),
            price_date,
            close_price,
        });
    }

    /// Indian-market demo dataset: five customers, six portfolios, NSE
    /// large caps, with roughly three months of monthly closes so the
    /// performance series has something to show.
    #[must_use]
    pub fn with_demo_data() -> Self {
        let mut store = Self::new();
        let today = Utc::now().date_naive();

        let raj = store.add_user("raj_investor", "Raj", "Patel", "ABCDE1234F", "Mumbai", "Maharashtra");
        let priya = store.add_user("priya_trader", "Priya", "Sharma", "FGHIJ5678K", "New Delhi", "Delhi");
        let amit = store.add_user("amit_growth", "Amit", "Kumar", "KLMNO9012P", "Bengaluru", "Karnataka");
        let sneha = store.add_user("sneha_value", "Sneha", "Reddy", "PQRST3456U", "Hyderabad", "Telangana");
        let vikram = store.add_user("vikram_sip", "Vikram", "Singh", "UVWXY7890Z", "Pune", "Maharashtra");

        store.add_stock(
            "TCS",
            "Tata Consultancy Services Limited",
            "Information Technology",
            Exchange::Nse,
            MarketCap::Large,
        );
        store.add_stock(
            "INFY",
            "Infosys Limited",
            "Information Technology",
            Exchange::Nse,
            MarketCap::Large,
        );
        store.add_stock(
            "RELIANCE",
            "Reliance Industries Limited",
            "Oil Gas & Consumable Fuels",
            Exchange::Nse,
            MarketCap::Large,
        );
        store.add_stock(
            "HDFCBANK",
            "HDFC Bank Limited",
            "Financial Services",
            Exchange::Nse,
            MarketCap::Large,
        );
        store.add_stock(
            "ICICIBANK",
            "ICICI Bank Limited",
            "Financial Services",
            Exchange::Nse,
            MarketCap::Large,
        );
        store.add_stock(
            "MARUTI",
            "Maruti Suzuki India Limited",
            "Automobile and Auto Components",
            Exchange::Nse,
            MarketCap::Large,
        );

        let tech = store.add_portfolio(raj, "Tech Focus Portfolio", "Concentrated IT bets");
        store.add_portfolio(raj, "Dividend Income Portfolio", "Yield plays, not funded yet");
        let growth = store.add_portfolio(priya, "Growth Portfolio", "High-conviction growth");
        let blue_chip = store.add_portfolio(amit, "Blue Chip Portfolio", "Large-cap compounders");
        let banking = store.add_portfolio(sneha, "Banking & Finance", "Financials only");
        let sip = store.add_portfolio(vikram, "Monthly SIP Portfolio", "Systematic monthly buys");

        store.add_holding(tech, "TCS", 50.0, 4100.00);
        store.add_holding(tech, "INFY", 100.0, 1800.00);
        store.add_holding(growth, "RELIANCE", 200.0, 2950.00);
        store.add_holding(growth, "HDFCBANK", 150.0, 1670.00);
        store.add_holding(blue_chip, "MARUTI", 15.0, 11850.00);
        store.add_holding(banking, "ICICIBANK", 200.0, 1285.00);
        store.add_holding(sip, "ICICIBANK", 950.0, 1315.00);

        // Latest closes plus a short monthly history per symbol
        let closes: &[(&str, [f64; 4])] = &[
            ("TCS", [3980.00, 4050.50, 4120.80, 4165.30]),
            ("INFY", [1752.00, 1788.40, 1810.20, 1835.60]),
            ("RELIANCE", [2890.00, 2925.60, 2960.10, 2998.40]),
            ("HDFCBANK", [1640.00, 1662.30, 1678.90, 1695.80]),
            ("ICICIBANK", [1262.00, 1284.50, 1301.20, 1320.50]),
            ("MARUTI", [11620.00, 11780.00, 11960.00, 12150.00]),
        ];
        for (symbol, history) in closes {
            for (months_ago, close) in history.iter().rev().enumerate() {
                let date = today
                    .checked_sub_days(Days::new(30 * months_ago as u64))
                    .unwrap_or(today);
                store.add_price(symbol, date, *close);
            }
        }

        store
    }

    fn portfolio_ids_in_scope(&self, scope: &Scope) -> Vec<PortfolioId> {
        match scope {
            Scope::All => self.portfolios.iter().map(|p| p.id).collect(),
            Scope::User(username) => {
                let Some(user) = self.users.iter().find(|u| &u.username == username) else {
                    return Vec::new();
                };
                self.portfolios
                    .iter()
                    .filter(|p| p.user_id == user.id)
                    .map(|p| p.id)
                    .collect()
            }
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
impl PortfolioStore for InMemoryStore {
    async fn users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.clone())
    }

    async fn stocks(&self) -> Result<Vec<Stock>, StoreError> {
        Ok(self.stocks.clone())
    }

    async fn portfolios(&self, scope: &Scope) -> Result<Vec<Portfolio>, StoreError> {
        let ids = self.portfolio_ids_in_scope(scope);
        Ok(self
            .portfolios
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn holdings(&self, scope: &Scope) -> Result<Vec<Holding>, StoreError> {
        let ids = self.portfolio_ids_in_scope(scope);
        Ok(self
            .holdings
            .iter()
            .filter(|h| ids.contains(&h.portfolio_id))
            .cloned()
            .collect())
    }

    async fn latest_prices(&self) -> Result<Vec<PriceObservation>, StoreError> {
        let mut latest: HashMap<&str, &PriceObservation> = HashMap::new();
        for obs in &self.prices {
            match latest.entry(obs.symbol.as_str()) {
                Entry::Occupied(mut e) if e.get().price_date < obs.price_date => {
                    e.insert(obs);
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(e) => {
                    e.insert(obs);
                }
            }
        }
        Ok(latest.into_values().cloned().collect())
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
