use axum::{Json, extract::Query, extract::State, http::StatusCode, response::IntoResponse};
use domain::engine::{EnrichedHolding, PerformancePoint, PortfolioOverview, PortfolioSummary};
use domain::portfolio::PortfolioId;
use domain::scope::{Period, Scope};
use serde::Deserialize;
use utoipa::IntoParams;

use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use super::AppState;

/// Scope filter common to the aggregation endpoints. The portfolio filter
/// is narrower and wins when both are supplied.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ScopeQuery {
    /// Restrict to one user's holdings
    pub username: Option<String>,
    /// Restrict to a single portfolio
    #[param(value_type = Option<String>, format = Uuid)]
    pub portfolio_id: Option<PortfolioId>,
}

impl ScopeQuery {
    fn into_scope(self) -> Scope {
        Scope::from_query(self.username, self.portfolio_id)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PerformanceQuery {
    pub username: Option<String>,
    #[param(value_type = Option<String>, format = Uuid)]
    pub portfolio_id: Option<PortfolioId>,
    /// Trailing window: 1M, 3M (default), 6M or 1Y
    pub period: Option<String>,
}

pub fn router(state: AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .with_state(state)
        .routes(routes!(get_portfolio_summary))
        .routes(routes!(get_holdings))
        .routes(routes!(get_portfolios))
        .routes(routes!(get_performance))
}

/// Portfolio summary
///
/// Aggregate invested capital, market value and unrealized gain/loss for
/// the scope. Without a filter, per-user aggregates are summed across the
/// whole customer base.
#[utoipa::path(
    get,
    path = "/api/portfolio-summary",
    params(ScopeQuery),
    responses(
        (status = 200, description = "Summary computed", body = PortfolioSummary),
        (status = 500, description = "Internal server error")
    ),
    tag = super::PORTFOLIO_TAG
)]
async fn get_portfolio_summary(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> impl IntoResponse {
    match state.tracker().portfolio_summary(&query.into_scope()).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => {
            tracing::error!("Failed to compute portfolio summary: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Current holdings
///
/// Holdings in scope enriched with reference data and latest prices,
/// largest market value first. When both `username` and `portfolio_id`
/// are supplied, `portfolio_id` takes precedence and `username` is
/// ignored.
#[utoipa::path(
    get,
    path = "/api/holdings",
    params(ScopeQuery),
    responses(
        (status = 200, description = "Holdings found", body = [EnrichedHolding]),
        (status = 500, description = "Internal server error")
    ),
    tag = super::PORTFOLIO_TAG
)]
async fn get_holdings(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> impl IntoResponse {
    match state.tracker().holdings(&query.into_scope()).await {
        Ok(holdings) => Json(holdings).into_response(),
        Err(e) => {
            tracing::error!("Failed to list holdings: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// List portfolios
///
/// Per-portfolio invested and current totals, most valuable first.
/// Portfolios without holdings are included with zeros.
#[utoipa::path(
    get,
    path = "/api/portfolios",
    params(ScopeQuery),
    responses(
        (status = 200, description = "Portfolios found", body = [PortfolioOverview]),
        (status = 500, description = "Internal server error")
    ),
    tag = super::PORTFOLIO_TAG
)]
async fn get_portfolios(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> impl IntoResponse {
    match state.tracker().portfolios(&query.into_scope()).await {
        Ok(portfolios) => Json(portfolios).into_response(),
        Err(e) => {
            tracing::error!("Failed to list portfolios: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Portfolio value over time
///
/// Value of the scope's holdings at each observation date inside the
/// trailing window, chronological order. Current share counts are applied
/// retroactively to historical closes.
#[utoipa::path(
    get,
    path = "/api/performance",
    params(PerformanceQuery),
    responses(
        (status = 200, description = "Series computed", body = [PerformancePoint]),
        (status = 500, description = "Internal server error")
    ),
    tag = super::PORTFOLIO_TAG
)]
async fn get_performance(
    State(state): State<AppState>,
    Query(query): Query<PerformanceQuery>,
) -> impl IntoResponse {
    let period = Period::parse_or_default(query.period.as_deref());
    let scope = Scope::from_query(query.username, query.portfolio_id);

    match state.tracker().performance(&scope, period).await {
        Ok(series) => Json(series).into_response(),
        Err(e) => {
            tracing::error!("Failed to compute performance series: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
