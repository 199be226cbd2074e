use chrono::NaiveDate;
use uuid::Uuid;

use domain::scope::Scope;
use domain::stock::{Exchange, MarketCap};
use domain::store::PortfolioStore;

use crate::db::PostgresStore;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        username TEXT NOT NULL,
        email TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        pan_number TEXT NOT NULL,
        phone_number TEXT NOT NULL,
        city TEXT NOT NULL,
        state TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS stocks (
        symbol TEXT PRIMARY KEY,
        company_name TEXT NOT NULL,
        sector TEXT NOT NULL,
        exchange TEXT NOT NULL,
        market_cap_category TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS portfolios (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL,
        name TEXT NOT NULL,
        description TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS holdings (
        portfolio_id UUID NOT NULL,
        symbol TEXT NOT NULL,
        shares_held DOUBLE PRECISION NOT NULL,
        average_purchase_price DOUBLE PRECISION NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS stock_prices (
        symbol TEXT NOT NULL,
        price_date DATE NOT NULL,
        close_price DOUBLE PRECISION NOT NULL
    )",
];

// Runs only when DATABASE_URL points at a reachable Postgres; skips
// silently otherwise so the suite passes without a database.
#[tokio::test]
async fn test_postgres_store_scoped_reads() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    if std::env::var("DATABASE_URL").is_err() {
        return Ok(());
    }

    let store = PostgresStore::connect().await?;
    let pool = store.pool().clone();

    for ddl in SCHEMA {
        sqlx::query(ddl).execute(&pool).await?;
    }
    for table in ["stock_prices", "holdings", "portfolios", "stocks", "users"] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&pool)
            .await?;
    }

    let user_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, username, email, first_name, last_name,
                            pan_number, phone_number, city, state)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(user_id)
    .bind("raj_investor")
    .bind("raj@example.in")
    .bind("Raj")
    .bind("Patel")
    .bind("ABCDE1234F")
    .bind("+91-9876543210")
    .bind("Mumbai")
    .bind("Maharashtra")
    .execute(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO stocks (symbol, company_name, sector, exchange, market_cap_category)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind("TCS")
    .bind("Tata Consultancy Services Limited")
    .bind("Information Technology")
    .bind("NSE")
    .bind("Large Cap")
    .execute(&pool)
    .await?;

    let portfolio_id = Uuid::new_v4();
    sqlx::query("INSERT INTO portfolios (id, user_id, name, description) VALUES ($1, $2, $3, $4)")
        .bind(portfolio_id)
        .bind(user_id)
        .bind("Tech Focus Portfolio")
        .bind("Concentrated IT bets")
        .execute(&pool)
        .await?;

    sqlx::query(
        "INSERT INTO holdings (portfolio_id, symbol, shares_held, average_purchase_price)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(portfolio_id)
    .bind("TCS")
    .bind(50.0_f64)
    .bind(4100.0_f64)
    .execute(&pool)
    .await?;

    for (date, close) in [("2025-07-29", 4120.80_f64), ("2025-07-30", 4165.30_f64)] {
        sqlx::query("INSERT INTO stock_prices (symbol, price_date, close_price) VALUES ($1, $2, $3)")
            .bind("TCS")
            .bind(date.parse::<NaiveDate>()?)
            .bind(close)
            .execute(&pool)
            .await?;
    }

    // Reference reads
    let users = store.users().await?;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "raj_investor");

    let stocks = store.stocks().await?;
    assert_eq!(stocks.len(), 1);
    assert_eq!(stocks[0].exchange, Exchange::Nse);
    assert_eq!(stocks[0].market_cap_category, MarketCap::Large);

    // Scoped reads
    let scope = Scope::User("raj_investor".to_string());
    let portfolios = store.portfolios(&scope).await?;
    assert_eq!(portfolios.len(), 1);

    let holdings = store.holdings(&scope).await?;
    assert_eq!(holdings.len(), 1);
    assert!((holdings[0].shares_held - 50.0).abs() < f64::EPSILON);

    let nothing = store
        .holdings(&Scope::User("nobody".to_string()))
        .await?;
    assert!(nothing.is_empty());

    // Latest price: DISTINCT ON keeps the max date per symbol
    let latest = store.latest_prices().await?;
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].price_date, "2025-07-30".parse::<NaiveDate>()?);

    let since = store.prices_since("2025-07-30".parse()?).await?;
    assert_eq!(since.len(), 1);

    for table in ["stock_prices", "holdings", "portfolios", "stocks", "users"] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
            .execute(&pool)
            .await?;
    }

    Ok(())
}
