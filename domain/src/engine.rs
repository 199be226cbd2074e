use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::portfolio::{Holding, Portfolio, PortfolioId};
use crate::price::{PriceBook, PriceObservation};
use crate::scope::Scope;
use crate::stock::{Exchange, MarketCap, Stock};
use crate::user::User;

/// Division policy shared by every percentage computation: a zero or
/// non-finite denominator yields `0.0` instead of NaN or infinity.
#[must_use]
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

/// Aggregate financial metrics for a scope.
///
/// `username` is set for single-user and single-portfolio scopes when the
/// subject exists; `total_users` is set for the all-users scope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PortfolioSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_users: Option<usize>,
    pub total_portfolios: usize,
    pub total_invested: f64,
    pub total_current_value: f64,
    pub total_unrealized_gain_loss: f64,
    pub unrealized_pl_pct: f64,
    pub total_unique_stocks: usize,
}

impl PortfolioSummary {
    fn empty() -> Self {
        Self {
            username: None,
            total_users: None,
            total_portfolios: 0,
            total_invested: 0.0,
            total_current_value: 0.0,
            total_unrealized_gain_loss: 0.0,
            unrealized_pl_pct: 0.0,
            total_unique_stocks: 0,
        }
    }
}

/// A holding joined against its portfolio, owner, stock reference data and
/// the latest known price.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrichedHolding {
    #[schema(value_type = String, format = Uuid)]
    pub portfolio_id: PortfolioId,
    pub portfolio_name: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub symbol: String,
    pub company_name: String,
    pub sector: String,
    pub exchange: Exchange,
    pub market_cap_category: MarketCap,
    pub shares_held: f64,
    pub average_purchase_price: f64,
    pub total_invested: f64,
    /// Latest close, `null` when no observation exists for the stock
    pub current_price: Option<f64>,
    pub current_market_value: f64,
    pub unrealized_gain_loss: f64,
    pub unrealized_return_pct: f64,
}

/// Per-portfolio totals for the portfolio listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PortfolioOverview {
    #[schema(value_type = String, format = Uuid)]
    pub portfolio_id: PortfolioId,
    pub name: String,
    pub description: String,
    pub username: String,
    pub total_invested: f64,
    pub current_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SectorAllocation {
    pub sector: String,
    pub sector_value: f64,
    /// Share of the scope's total market value, 0-100
    pub percentage: f64,
}

/// Per-symbol aggregate across all portfolios that hold it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopPerformer {
    pub symbol: String,
    pub company_name: String,
    pub sector: String,
    pub held_by_portfolios: usize,
    pub avg_purchase_price_all_portfolios: f64,
    pub current_price: f64,
    pub avg_return_pct: f64,
    pub total_market_value_all_portfolios: f64,
}

/// One point of the portfolio-value time series.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PerformancePoint {
    pub price_date: NaiveDate,
    pub portfolio_value: f64,
}

/// Joins holdings against portfolios, owners, stocks and latest prices, and
/// orders the result by current market value, largest first.
///
/// A holding whose stock has no price observation yet stays in the result
/// with a `null` price and contributes zero to every value aggregate. A
/// holding with a dangling portfolio or stock reference is dropped with a
/// warning; reference data is provisioned externally and assumed complete.
#[must_use]
pub fn enrich_holdings(
    holdings: &[Holding],
    portfolios: &[Portfolio],
    users: &[User],
    stocks: &[Stock],
    prices: &PriceBook,
) -> Vec<EnrichedHolding> {
    let portfolios_by_id: HashMap<PortfolioId, &Portfolio> =
        portfolios.iter().map(|p| (p.id, p)).collect();
    let users_by_id: HashMap<_, &User> = users.iter().map(|u| (u.id, u)).collect();
    let stocks_by_symbol: HashMap<&str, &Stock> =
        stocks.iter().map(|s| (s.symbol.as_str(), s)).collect();

    let mut enriched: Vec<EnrichedHolding> = holdings
        .iter()
        .filter_map(|holding| {
            let Some(portfolio) = portfolios_by_id.get(&holding.portfolio_id) else {
                warn!(symbol = %holding.symbol, "Holding references unknown portfolio");
                return None;
            };
            let Some(user) = users_by_id.get(&portfolio.user_id) else {
                warn!(portfolio = %portfolio.name, "Portfolio owner missing from user set");
                return None;
            };
            let Some(stock) = stocks_by_symbol.get(holding.symbol.as_str()) else {
                warn!(symbol = %holding.symbol, "Holding references unknown stock");
                return None;
            };

            let total_invested = holding.total_invested();
            let current_price = prices.close(&holding.symbol);
            let current_market_value = current_price.unwrap_or(0.0) * holding.shares_held;
            let unrealized_gain_loss = current_market_value - total_invested;

            Some(EnrichedHolding {
                portfolio_id: holding.portfolio_id,
                portfolio_name: portfolio.name.clone(),
                username: user.username.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                symbol: holding.symbol.clone(),
                company_name: stock.company_name.clone(),
                sector: stock.sector.clone(),
                exchange: stock.exchange,
                market_cap_category: stock.market_cap_category,
                shares_held: holding.shares_held,
                average_purchase_price: holding.average_purchase_price,
                total_invested,
                current_price,
                current_market_value,
                unrealized_gain_loss,
                unrealized_return_pct: safe_ratio(unrealized_gain_loss, total_invested) * 100.0,
            })
        })
        .collect();

    enriched.sort_by(|a, b| b.current_market_value.total_cmp(&a.current_market_value));
    enriched
}

/// Computes the portfolio summary for a scope.
///
/// For the all-users scope each user is aggregated on their own and the
/// per-user results are summed, so users with zero holdings still contribute
/// zeros and `total_unique_stocks` counts a symbol once per user holding it.
#[must_use]
pub fn summarize(
    scope: &Scope,
    enriched: &[EnrichedHolding],
    portfolios: &[Portfolio],
    users: &[User],
) -> PortfolioSummary {
    match scope {
        Scope::All => {
            let mut totals = PortfolioSummary::empty();
            totals.total_users = Some(users.len());
            for user in users {
                let per_user = summarize_user(&user.username, enriched, portfolios, users);
                totals.total_portfolios += per_user.total_portfolios;
                totals.total_invested += per_user.total_invested;
                totals.total_current_value += per_user.total_current_value;
                totals.total_unrealized_gain_loss += per_user.total_unrealized_gain_loss;
                totals.total_unique_stocks += per_user.total_unique_stocks;
            }
            totals.unrealized_pl_pct =
                safe_ratio(totals.total_unrealized_gain_loss, totals.total_invested) * 100.0;
            totals
        }
        Scope::User(username) => {
            let mut summary = summarize_user(username, enriched, portfolios, users);
            summary.username = users
                .iter()
                .find(|u| &u.username == username)
                .map(|u| u.username.clone());
            summary
        }
        Scope::Portfolio(id) => {
            let rows: Vec<&EnrichedHolding> =
                enriched.iter().filter(|h| h.portfolio_id == *id).collect();
            let portfolio = portfolios.iter().find(|p| p.id == *id);
            let username = portfolio.and_then(|p| {
                users
                    .iter()
                    .find(|u| u.id == p.user_id)
                    .map(|u| u.username.clone())
            });

            let mut summary = sum_rows(&rows);
            summary.username = username;
            summary.total_portfolios = usize::from(portfolio.is_some());
            summary
        }
    }
}

fn summarize_user(
    username: &str,
    enriched: &[EnrichedHolding],
    portfolios: &[Portfolio],
    users: &[User],
) -> PortfolioSummary {
    let rows: Vec<&EnrichedHolding> =
        enriched.iter().filter(|h| h.username == username).collect();
    let owned_portfolios = users
        .iter()
        .find(|u| u.username == username)
        .map_or(0, |user| {
            portfolios.iter().filter(|p| p.user_id == user.id).count()
        });

    let mut summary = sum_rows(&rows);
    summary.total_portfolios = owned_portfolios;
    summary
}

fn sum_rows(rows: &[&EnrichedHolding]) -> PortfolioSummary {
    let total_invested: f64 = rows.iter().map(|h| h.total_invested).sum();
    let total_current_value: f64 = rows.iter().map(|h| h.current_market_value).sum();
    let total_unrealized_gain_loss = total_current_value - total_invested;
    let unique_stocks: HashSet<&str> = rows.iter().map(|h| h.symbol.as_str()).collect();

    PortfolioSummary {
        username: None,
        total_users: None,
        total_portfolios: 0,
        total_invested,
        total_current_value,
        total_unrealized_gain_loss,
        unrealized_pl_pct: safe_ratio(total_unrealized_gain_loss, total_invested) * 100.0,
        total_unique_stocks: unique_stocks.len(),
    }
}

/// Market value per distinct sector in scope, with each sector's share of
/// the scope total, ordered by value descending.
#[must_use]
pub fn sector_allocation(enriched: &[EnrichedHolding]) -> Vec<SectorAllocation> {
    let mut by_sector: HashMap<&str, f64> = HashMap::new();
    for holding in enriched {
        *by_sector.entry(holding.sector.as_str()).or_insert(0.0) += holding.current_market_value;
    }
    let total: f64 = by_sector.values().sum();

    let mut allocations: Vec<SectorAllocation> = by_sector
        .into_iter()
        .map(|(sector, sector_value)| SectorAllocation {
            sector: sector.to_string(),
            sector_value,
            percentage: safe_ratio(sector_value, total) * 100.0,
        })
        .collect();
    allocations.sort_by(|a, b| b.sector_value.total_cmp(&a.sector_value));
    allocations
}

/// Groups all holdings by symbol and ranks symbols by the return of the mean
/// cost basis against the latest close, best first, truncated to `limit`.
///
/// Symbols without a latest price, or with a zero mean cost basis, have no
/// defined return and are excluded rather than ranked.
#[must_use]
pub fn top_performers(enriched: &[EnrichedHolding], limit: usize) -> Vec<TopPerformer> {
    struct SymbolAcc<'a> {
        company_name: &'a str,
        sector: &'a str,
        portfolios: HashSet<PortfolioId>,
        cost_sum: f64,
        cost_count: usize,
        market_value: f64,
        current_price: Option<f64>,
    }

    let mut by_symbol: HashMap<&str, SymbolAcc> = HashMap::new();
    for holding in enriched {
        let acc = by_symbol
            .entry(holding.symbol.as_str())
            .or_insert_with(|| SymbolAcc {
                company_name: &holding.company_name,
                sector: &holding.sector,
                portfolios: HashSet::new(),
                cost_sum: 0.0,
                cost_count: 0,
                market_value: 0.0,
                current_price: holding.current_price,
            });
        acc.portfolios.insert(holding.portfolio_id);
        acc.cost_sum += holding.average_purchase_price;
        acc.cost_count += 1;
        acc.market_value += holding.current_market_value;
    }

    let mut performers: Vec<TopPerformer> = by_symbol
        .into_iter()
        .filter_map(|(symbol, acc)| {
            let current_price = acc.current_price?;
            let avg_cost = safe_ratio(acc.cost_sum, acc.cost_count as f64);
            if avg_cost == 0.0 {
                return None;
            }
            Some(TopPerformer {
                symbol: symbol.to_string(),
                company_name: acc.company_name.to_string(),
                sector: acc.sector.to_string(),
                held_by_portfolios: acc.portfolios.len(),
                avg_purchase_price_all_portfolios: avg_cost,
                current_price,
                avg_return_pct: safe_ratio(current_price - avg_cost, avg_cost) * 100.0,
                total_market_value_all_portfolios: acc.market_value,
            })
        })
        .collect();

    performers.sort_by(|a, b| b.avg_return_pct.total_cmp(&a.avg_return_pct));
    performers.truncate(limit);
    performers
}

/// Per-portfolio invested and current totals, ordered by current value
/// descending. Portfolios with zero holdings stay in the list with zeros.
#[must_use]
pub fn portfolio_overviews(
    portfolios: &[Portfolio],
    users: &[User],
    enriched: &[EnrichedHolding],
) -> Vec<PortfolioOverview> {
    let users_by_id: HashMap<_, &User> = users.iter().map(|u| (u.id, u)).collect();

    let mut overviews: Vec<PortfolioOverview> = portfolios
        .iter()
        .filter_map(|portfolio| {
            let user = users_by_id.get(&portfolio.user_id)?;
            let rows = enriched.iter().filter(|h| h.portfolio_id == portfolio.id);
            let (invested, value) = rows.fold((0.0, 0.0), |(inv, val), h| {
                (inv + h.total_invested, val + h.current_market_value)
            });
            Some(PortfolioOverview {
                portfolio_id: portfolio.id,
                name: portfolio.name.clone(),
                description: portfolio.description.clone(),
                username: user.username.clone(),
                total_invested: invested,
                current_value: value,
            })
        })
        .collect();
    overviews.sort_by(|a, b| b.current_value.total_cmp(&a.current_value));
    overviews
}

/// Portfolio value over time: current share counts applied to each
/// observation date's closes, chronological order.
///
/// Share counts are applied retroactively; the series does not model
/// historical position changes.
#[must_use]
pub fn performance_series(
    holdings: &[Holding],
    observations: &[PriceObservation],
) -> Vec<PerformancePoint> {
    let mut shares_by_symbol: HashMap<&str, f64> = HashMap::new();
    for holding in holdings {
        *shares_by_symbol.entry(holding.symbol.as_str()).or_insert(0.0) += holding.shares_held;
    }

    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for obs in observations {
        if let Some(shares) = shares_by_symbol.get(obs.symbol.as_str()) {
            *by_date.entry(obs.price_date).or_insert(0.0) += shares * obs.close_price;
        }
    }

    by_date
        .into_iter()
        .map(|(price_date, portfolio_value)| PerformancePoint {
            price_date,
            portfolio_value,
        })
        .collect()
}
