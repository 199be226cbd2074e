use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_swagger_ui::SwaggerUi;

use crate::services::TrackerHandle;

mod market;
mod portfolio;
mod user;

const USER_TAG: &str = "user";
const PORTFOLIO_TAG: &str = "portfolio";
const MARKET_TAG: &str = "market";

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
    ),
    tags(
        (name = USER_TAG, description = "Customer reference data"),
        (name = PORTFOLIO_TAG, description = "Scoped portfolio aggregation endpoints"),
        (name = MARKET_TAG, description = "Cross-portfolio market endpoints")
    )
)]
struct ApiDoc;

/// Get health of the API.
#[utoipa::path(
    method(get, head),
    path = "/api/health",
    responses(
        (status = OK, description = "Success", body = str, content_type = "text/plain")
    )
)]
async fn health() -> &'static str {
    "ok"
}

pub type AppState = TrackerHandle;

pub fn create_api(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(health))
        .merge(user::router(state.clone()))
        .merge(portfolio::router(state.clone()))
        .merge(market::router(state.clone()))
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/apidoc/openapi.json", api))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
