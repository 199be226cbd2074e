use axum::{Json, extract::Query, extract::State, http::StatusCode, response::IntoResponse};
use domain::core::DEFAULT_TOP_PERFORMERS_LIMIT;
use domain::engine::{SectorAllocation, TopPerformer};
use domain::scope::Scope;
use serde::Deserialize;
use utoipa::IntoParams;

use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use super::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SectorQuery {
    /// Restrict to one user's holdings
    pub username: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TopPerformersQuery {
    /// Maximum number of symbols to return, default 10
    pub limit: Option<usize>,
}

pub fn router(state: AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .with_state(state)
        .routes(routes!(get_sector_allocation))
        .routes(routes!(get_top_performers))
}

/// Sector allocation
///
/// Market value per sector in scope, with each sector's weight against the
/// scope total, largest sector first.
#[utoipa::path(
    get,
    path = "/api/sector-allocation",
    params(SectorQuery),
    responses(
        (status = 200, description = "Allocation computed", body = [SectorAllocation]),
        (status = 500, description = "Internal server error")
    ),
    tag = super::MARKET_TAG
)]
async fn get_sector_allocation(
    State(state): State<AppState>,
    Query(query): Query<SectorQuery>,
) -> impl IntoResponse {
    let scope = Scope::from_query(query.username, None);
    match state.tracker().sector_allocation(&scope).await {
        Ok(allocations) => Json(allocations).into_response(),
        Err(e) => {
            tracing::error!("Failed to compute sector allocation: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Top performers
///
/// Symbols ranked by the return of their mean cost basis across all
/// portfolios against the latest close, best first. Symbols without a
/// price or with a zero cost basis are excluded.
#[utoipa::path(
    get,
    path = "/api/top-performers",
    params(TopPerformersQuery),
    responses(
        (status = 200, description = "Performers ranked", body = [TopPerformer]),
        (status = 500, description = "Internal server error")
    ),
    tag = super::MARKET_TAG
)]
async fn get_top_performers(
    State(state): State<AppState>,
    Query(query): Query<TopPerformersQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_PERFORMERS_LIMIT);
    match state.tracker().top_performers(limit).await {
        Ok(performers) => Json(performers).into_response(),
        Err(e) => {
            tracing::error!("Failed to rank top performers: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
