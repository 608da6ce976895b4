use axum::{
    extract::State,
    routing::{get, patch, post, put},
    Router,
};
use serde_json::Value;
use uuid::Uuid;

use models::affiliation;
use service::pagination::ListQuery;
use service::services::affiliation_service::{self, CreateAffiliation, UpdateAffiliation};

use crate::errors::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::response::{self, Reply};
use crate::routes::reorder;
use crate::state::ServerState;

pub fn public() -> Router<ServerState> {
    Router::new()
        .route("/api/affiliations", get(list))
        .route("/api/affiliations/:id", get(get_one))
}

pub fn protected() -> Router<ServerState> {
    Router::new()
        .route("/api/affiliations", post(create))
        .route("/api/affiliations/reorder", put(reorder_affiliations))
        .route("/api/affiliations/:id", patch(update).delete(delete))
}

#[utoipa::path(get, path = "/api/affiliations", tag = "affiliations", params(crate::openapi::ListQueryDoc), responses((status = 200, description = "Paged affiliations, active only unless isActive is given")))]
pub async fn list(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Reply<Vec<affiliation::Model>>, ApiError> {
    Ok(response::page(affiliation_service::list(&state.db, &query).await?))
}

#[utoipa::path(get, path = "/api/affiliations/{id}", tag = "affiliations", params(("id" = Uuid, Path,)), responses((status = 200, description = "Affiliation"), (status = 404, description = "Not found")))]
pub async fn get_one(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<affiliation::Model>, ApiError> {
    Ok(response::ok(affiliation_service::get(&state.db, id).await?))
}

#[utoipa::path(post, path = "/api/affiliations", tag = "affiliations", responses((status = 201, description = "Created"), (status = 400, description = "Validation failed"), (status = 409, description = "Name or acronym taken")))]
pub async fn create(
    State(state): State<ServerState>,
    AppJson(input): AppJson<CreateAffiliation>,
) -> Result<Reply<affiliation::Model>, ApiError> {
    let created = affiliation_service::create(&state.db, input).await?;
    Ok(response::created("Affiliation created successfully", created))
}

#[utoipa::path(patch, path = "/api/affiliations/{id}", tag = "affiliations", params(("id" = Uuid, Path,)), responses((status = 200, description = "Updated"), (status = 404, description = "Not found"), (status = 409, description = "Name or acronym taken")))]
pub async fn update(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateAffiliation>,
) -> Result<Reply<affiliation::Model>, ApiError> {
    let updated = affiliation_service::update(&state.db, id, input).await?;
    Ok(response::updated("Affiliation updated successfully", updated))
}

#[utoipa::path(delete, path = "/api/affiliations/{id}", tag = "affiliations", params(("id" = Uuid, Path,)), responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<()>, ApiError> {
    affiliation_service::delete(&state.db, id).await?;
    Ok(response::message("Affiliation deleted successfully"))
}

#[utoipa::path(put, path = "/api/affiliations/reorder", tag = "affiliations", request_body = crate::openapi::ReorderRequest, responses((status = 200, description = "Reordered"), (status = 400, description = "Empty or duplicate ids"), (status = 404, description = "Unknown ids")))]
pub async fn reorder_affiliations(State(state): State<ServerState>, AppJson(body): AppJson<Value>) -> Result<Reply<()>, ApiError> {
    reorder::<affiliation::Entity>(&state, "affiliationIds", &body, "Affiliations reordered successfully").await
}
