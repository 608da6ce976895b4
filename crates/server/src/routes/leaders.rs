use axum::{
    extract::State,
    routing::{get, patch, post, put},
    Router,
};
use serde_json::Value;
use uuid::Uuid;

use models::leader;
use service::services::leader_service::{self, CreateLeader, LeaderQuery, UpdateLeader};

use crate::errors::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery, FormOrJson};
use crate::response::{self, Reply};
use crate::routes::reorder;
use crate::state::ServerState;

pub fn public() -> Router<ServerState> {
    Router::new()
        .route("/api/leaders", get(list))
        .route("/api/leaders/departments", get(departments))
        .route("/api/leaders/:id", get(get_one))
}

pub fn protected() -> Router<ServerState> {
    Router::new()
        .route("/api/leaders", post(create))
        .route("/api/leaders/reorder", put(reorder_leaders))
        .route("/api/leaders/:id", patch(update).delete(delete))
        .route("/api/leaders/:id/toggle-status", patch(toggle_status))
}

#[utoipa::path(get, path = "/api/leaders", tag = "leaders", params(crate::openapi::ListQueryDoc, ("department" = Option<String>, Query,)), responses((status = 200, description = "Paged leaders"), (status = 400, description = "Invalid query")))]
pub async fn list(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<LeaderQuery>,
) -> Result<Reply<Vec<leader::Model>>, ApiError> {
    Ok(response::page(leader_service::list(&state.db, &query).await?))
}

#[utoipa::path(get, path = "/api/leaders/departments", tag = "leaders", responses((status = 200, description = "Distinct departments")))]
pub async fn departments(State(state): State<ServerState>) -> Result<Reply<Vec<String>>, ApiError> {
    Ok(response::ok(leader_service::departments(&state.db).await?))
}

#[utoipa::path(get, path = "/api/leaders/{id}", tag = "leaders", params(("id" = Uuid, Path,)), responses((status = 200, description = "Leader"), (status = 404, description = "Not found")))]
pub async fn get_one(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<leader::Model>, ApiError> {
    Ok(response::ok(leader_service::get(&state.db, id).await?))
}

#[utoipa::path(post, path = "/api/leaders", tag = "leaders", responses((status = 201, description = "Created"), (status = 400, description = "Validation failed"), (status = 409, description = "Duplicate name and title")))]
pub async fn create(State(state): State<ServerState>, form: FormOrJson<CreateLeader>) -> Result<Reply<leader::Model>, ApiError> {
    let created = leader_service::create(&state.db, state.images.as_ref(), form.data, form.upload).await?;
    Ok(response::created("Leader created successfully", created))
}

#[utoipa::path(patch, path = "/api/leaders/{id}", tag = "leaders", params(("id" = Uuid, Path,)), responses((status = 200, description = "Updated"), (status = 404, description = "Not found"), (status = 409, description = "Duplicate name and title")))]
pub async fn update(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
    form: FormOrJson<UpdateLeader>,
) -> Result<Reply<leader::Model>, ApiError> {
    let updated = leader_service::update(&state.db, state.images.as_ref(), id, form.data, form.upload).await?;
    Ok(response::updated("Leader updated successfully", updated))
}

#[utoipa::path(delete, path = "/api/leaders/{id}", tag = "leaders", params(("id" = Uuid, Path,)), responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<()>, ApiError> {
    leader_service::delete(&state.db, id).await?;
    Ok(response::message("Leader deleted successfully"))
}

#[utoipa::path(patch, path = "/api/leaders/{id}/toggle-status", tag = "leaders", params(("id" = Uuid, Path,)), responses((status = 200, description = "Status flipped"), (status = 404, description = "Not found")))]
pub async fn toggle_status(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<leader::Model>, ApiError> {
    let leader = leader_service::toggle_status(&state.db, id).await?;
    Ok(response::updated("Leader status updated", leader))
}

#[utoipa::path(put, path = "/api/leaders/reorder", tag = "leaders", request_body = crate::openapi::ReorderRequest, responses((status = 200, description = "Reordered"), (status = 400, description = "Empty or duplicate ids"), (status = 404, description = "Unknown ids")))]
pub async fn reorder_leaders(State(state): State<ServerState>, AppJson(body): AppJson<Value>) -> Result<Reply<()>, ApiError> {
    reorder::<leader::Entity>(&state, "leaderIds", &body, "Leaders reordered successfully").await
}
