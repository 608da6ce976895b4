use axum::{extract::State, routing::get, Router};

use service::services::stats_service::{self, DashboardStats};

use crate::errors::ApiError;
use crate::response::{self, Reply};
use crate::state::ServerState;

pub fn protected() -> Router<ServerState> {
    Router::new().route("/api/stats", get(dashboard))
}

#[utoipa::path(get, path = "/api/stats", tag = "stats", responses((status = 200, description = "Totals per resource plus pending work"), (status = 401, description = "Unauthorized")))]
pub async fn dashboard(State(state): State<ServerState>) -> Result<Reply<DashboardStats>, ApiError> {
    Ok(response::ok(stats_service::dashboard(&state.db).await?))
}
