use axum::{
    extract::State,
    routing::{get, patch, post, put},
    Router,
};
use serde_json::Value;
use uuid::Uuid;

use models::expert;
use service::pagination::ListQuery;
use service::services::expert_service::{self, CreateExpert, UpdateExpert};

use crate::errors::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery, FormOrJson};
use crate::response::{self, Reply};
use crate::routes::reorder;
use crate::state::ServerState;

pub fn public() -> Router<ServerState> {
    Router::new()
        .route("/api/experts", get(list))
        .route("/api/experts/:id", get(get_one))
}

pub fn protected() -> Router<ServerState> {
    Router::new()
        .route("/api/experts", post(create))
        .route("/api/experts/reorder", put(reorder_experts))
        .route("/api/experts/:id", patch(update).delete(delete))
        .route("/api/experts/:id/toggle-status", patch(toggle_status))
}

#[utoipa::path(get, path = "/api/experts", tag = "experts", params(crate::openapi::ListQueryDoc), responses((status = 200, description = "Paged experts"), (status = 400, description = "Invalid query")))]
pub async fn list(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Reply<Vec<expert::Model>>, ApiError> {
    Ok(response::page(expert_service::list(&state.db, &query).await?))
}

#[utoipa::path(get, path = "/api/experts/{id}", tag = "experts", params(("id" = Uuid, Path,)), responses((status = 200, description = "Expert"), (status = 404, description = "Not found")))]
pub async fn get_one(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<expert::Model>, ApiError> {
    Ok(response::ok(expert_service::get(&state.db, id).await?))
}

#[utoipa::path(post, path = "/api/experts", tag = "experts", responses((status = 201, description = "Created"), (status = 400, description = "Validation failed"), (status = 401, description = "Unauthorized"), (status = 409, description = "Duplicate name and title")))]
pub async fn create(
    State(state): State<ServerState>,
    form: FormOrJson<CreateExpert>,
) -> Result<Reply<expert::Model>, ApiError> {
    let created = expert_service::create(&state.db, state.images.as_ref(), form.data, form.upload).await?;
    Ok(response::created("Expert created successfully", created))
}

#[utoipa::path(patch, path = "/api/experts/{id}", tag = "experts", params(("id" = Uuid, Path,)), responses((status = 200, description = "Updated"), (status = 404, description = "Not found"), (status = 409, description = "Duplicate name and title")))]
pub async fn update(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
    form: FormOrJson<UpdateExpert>,
) -> Result<Reply<expert::Model>, ApiError> {
    let updated = expert_service::update(&state.db, state.images.as_ref(), id, form.data, form.upload).await?;
    Ok(response::updated("Expert updated successfully", updated))
}

#[utoipa::path(delete, path = "/api/experts/{id}", tag = "experts", params(("id" = Uuid, Path,)), responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<()>, ApiError> {
    expert_service::delete(&state.db, id).await?;
    Ok(response::message("Expert deleted successfully"))
}

#[utoipa::path(patch, path = "/api/experts/{id}/toggle-status", tag = "experts", params(("id" = Uuid, Path,)), responses((status = 200, description = "Status flipped"), (status = 404, description = "Not found")))]
pub async fn toggle_status(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<expert::Model>, ApiError> {
    let expert = expert_service::toggle_status(&state.db, id).await?;
    Ok(response::updated("Expert status updated", expert))
}

#[utoipa::path(put, path = "/api/experts/reorder", tag = "experts", request_body = crate::openapi::ReorderRequest, responses((status = 200, description = "Reordered"), (status = 400, description = "Empty or duplicate ids"), (status = 404, description = "Unknown ids")))]
pub async fn reorder_experts(State(state): State<ServerState>, AppJson(body): AppJson<Value>) -> Result<Reply<()>, ApiError> {
    reorder::<expert::Entity>(&state, "expertIds", &body, "Experts reordered successfully").await
}
