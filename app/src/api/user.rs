use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use domain::user::User;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use super::AppState;

pub fn router(state: AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .with_state(state)
        .routes(routes!(get_users))
}

/// List users
///
/// All provisioned customers, with their contact and location attributes.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users found", body = [User]),
        (status = 500, description = "Internal server error")
    ),
    tag = super::USER_TAG
)]
async fn get_users(State(state): State<AppState>) -> impl IntoResponse {
    match state.tracker().users().await {
        Ok(users) => Json(users).into_response(),
        Err(e) => {
            tracing::error!("Failed to list users: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests;
