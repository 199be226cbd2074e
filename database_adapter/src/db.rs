//! Postgres-backed `PortfolioStore`.
//!
//! Expected schema (provisioned by an external loading process, read-only
//! here):
//!
//! ```text
//! users(id UUID PK, username, email, first_name, last_name,
//!       pan_number, phone_number, city, state)
//! stocks(symbol TEXT PK, company_name, sector, exchange, market_cap_category)
//! portfolios(id UUID PK, user_id UUID, name, description)
//! holdings(portfolio_id UUID, symbol TEXT,
//!          shares_held DOUBLE PRECISION, average_purchase_price DOUBLE PRECISION)
//! stock_prices(symbol TEXT, price_date DATE, close_price DOUBLE PRECISION)
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use domain::portfolio::{Holding, Portfolio};
use domain::price::PriceObservation;
use domain::scope::Scope;
use domain::stock::Stock;
use domain::store::{PortfolioStore, StoreError};
use domain::user::User;

fn unavailable(error: sqlx::Error) -> StoreError {
    StoreError::Unavailable(error.to_string())
}

#[derive(Clone)]
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore").finish_non_exhaustive()
    }
}

impl PostgresStore {
    /// Connect using `DATABASE_URL` from the environment or a `.env` file.
    /// # Errors
    /// - Returns `StoreError` if the connection cannot be established
    /// # Panics
    /// - Panics if `DATABASE_URL` is not set in the environment or .env file
    pub async fn connect() -> Result<Self, StoreError> {
        dotenvy::dotenv().ok();
        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment");

        let pool = PgPoolOptions::new()
            .connect(&db_url)
            .await
            .map_err(unavailable)?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn with_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    pan_number: String,
    phone_number: String,
    city: String,
    state: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            pan_number: row.pan_number,
            phone_number: row.phone_number,
            city: row.city,
            state: row.state,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StockRow {
    symbol: String,
    company_name: String,
    sector: String,
    exchange: String,
    market_cap_category: String,
}

impl TryFrom<StockRow> for Stock {
    type Error = StoreError;

    fn try_from(row: StockRow) -> Result<Self, Self::Error> {
        Ok(Stock {
            exchange: row.exchange.parse().map_err(StoreError::Unavailable)?,
            market_cap_category: row
                .market_cap_category
                .parse()
                .map_err(StoreError::Unavailable)?,
            symbol: row.symbol,
            company_name: row.company_name,
            sector: row.sector,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PortfolioRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    description: String,
}

impl From<PortfolioRow> for Portfolio {
    fn from(row: PortfolioRow) -> Self {
        Portfolio {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(sqlx::FromRow)]
struct HoldingRow {
    portfolio_id: Uuid,
    symbol: String,
    shares_held: f64,
    average_purchase_price: f64,
}

impl From<HoldingRow> for Holding {
    fn from(row: HoldingRow) -> Self {
        Holding {
            portfolio_id: row.portfolio_id,
            symbol: row.symbol,
            shares_held: row.shares_held,
            average_purchase_price: row.average_purchase_price,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PriceRow {
    symbol: String,
    price_date: NaiveDate,
    close_price: f64,
}

impl From<PriceRow> for PriceObservation {
    fn from(row: PriceRow) -> Self {
        PriceObservation {
            symbol: row.symbol,
            price_date: row.price_date,
            close_price: row.close_price,
        }
    }
}

#[async_trait]
impl PortfolioStore for PostgresStore {
    async fn users(&self) -> Result<Vec<User>, StoreError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT id, username, email, first_name, last_name,
                    pan_number, phone_number, city, state
             FROM users",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn stocks(&self) -> Result<Vec<Stock>, StoreError> {
        let rows: Vec<StockRow> = sqlx::query_as(
            "SELECT symbol, company_name, sector, exchange, market_cap_category
             FROM stocks",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        rows.into_iter().map(Stock::try_from).collect()
    }

    async fn portfolios(&self, scope: &Scope) -> Result<Vec<Portfolio>, StoreError> {
        let rows: Vec<PortfolioRow> = match scope {
            Scope::All => {
                sqlx::query_as(
                    "SELECT p.id, p.user_id, p.name, p.description FROM portfolios p",
                )
                .fetch_all(&self.pool)
                .await
            }
            Scope::User(username) => {
                sqlx::query_as(
                    "SELECT p.id, p.user_id, p.name, p.description
                     FROM portfolios p
                     JOIN users u ON u.id = p.user_id
                     WHERE u.username = $1",
                )
                .bind(username)
                .fetch_all(&self.pool)
                .await
            }
            Scope::Portfolio(id) => {
                sqlx::query_as(
                    "SELECT p.id, p.user_id, p.name, p.description
                     FROM portfolios p
                     WHERE p.id = $1",
                )
                .bind(id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(unavailable)?;

        Ok(rows.into_iter().map(Portfolio::from).collect())
    }

    async fn holdings(&self, scope: &Scope) -> Result<Vec<Holding>, StoreError> {
        let rows: Vec<HoldingRow> = match scope {
            Scope::All => {
                sqlx::query_as(
                    "SELECT h.portfolio_id, h.symbol, h.shares_held, h.average_purchase_price
                     FROM holdings h",
                )
                .fetch_all(&self.pool)
                .await
            }
            Scope::User(username) => {
                sqlx::query_as(
                    "SELECT h.portfolio_id, h.symbol, h.shares_held, h.average_purchase_price
                     FROM holdings h
                     JOIN portfolios p ON p.id = h.portfolio_id
                     JOIN users u ON u.id = p.user_id
                     WHERE u.username = $1",
                )
                .bind(username)
                .fetch_all(&self.pool)
                .await
            }
            Scope::Portfolio(id) => {
                sqlx::query_as(
                    "SELECT h.portfolio_id, h.symbol, h.shares_held, h.average_purchase_price
                     FROM holdings h
                     WHERE h.portfolio_id = $1",
                )
                .bind(id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(unavailable)?;

        Ok(rows.into_iter().map(Holding::from).collect())
    }

    async fn latest_prices(&self) -> Result<Vec<PriceObservation>, StoreError> {
        let rows: Vec<PriceRow> = sqlx::query_as(
            "SELECT DISTINCT ON (symbol) symbol, price_date, close_price
             FROM stock_prices
             ORDER BY symbol, price_date DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(rows.into_iter().map(PriceObservation::from).collect())
    }

    async fn prices_since(&self, since: NaiveDate) -> Result<Vec<PriceObservation>, StoreError> {
        let rows: Vec<PriceRow> = sqlx::query_as(
            "SELECT symbol, price_date, close_price
             FROM stock_prices
             WHERE price_date >= $1
             ORDER BY price_date",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(rows.into_iter().map(PriceObservation::from).collect())
    }
}
