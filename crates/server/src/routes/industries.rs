use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete as delete_route, get, patch, post, put},
    Router,
};
use serde_json::Value;
use uuid::Uuid;

use models::{case_study, expert, industry, insight};
use service::pagination::ListQuery;
use service::relation_service::{self, Owner};
use service::services::industry_service::{self, CreateIndustry, IndustryDetail, IndustryStats, UpdateIndustry};
use service::services::{case_study_service, insight_service};

use crate::errors::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::response::{self, Reply};
use crate::routes::{reorder, AssignExpertRequest};
use crate::state::ServerState;

pub fn public() -> Router<ServerState> {
    Router::new()
        .route("/api/industries", get(list))
        .route("/api/industries/slug/:slug", get(get_by_slug))
        .route("/api/industries/:id", get(get_one))
        .route("/api/industries/:id/experts", get(experts))
        .route("/api/industries/:id/case-studies", get(case_studies))
        .route("/api/industries/:id/insights", get(insights))
        .route("/api/industries/:id/stats", get(stats))
}

pub fn protected() -> Router<ServerState> {
    Router::new()
        .route("/api/industries", post(create))
        .route("/api/industries/reorder", put(reorder_industries))
        .route("/api/industries/:id", patch(update).delete(delete))
        .route("/api/industries/:id/toggle-status", patch(toggle_status))
        .route("/api/industries/:id/experts", post(assign_expert))
        .route("/api/industries/:id/experts/:expert_id", delete_route(unassign_expert))
}

#[utoipa::path(get, path = "/api/industries", tag = "industries", params(crate::openapi::ListQueryDoc), responses((status = 200, description = "Paged industries"), (status = 400, description = "Invalid query")))]
pub async fn list(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Reply<Vec<industry::Model>>, ApiError> {
    Ok(response::page(industry_service::list(&state.db, &query).await?))
}

#[utoipa::path(get, path = "/api/industries/{id}", tag = "industries", params(("id" = Uuid, Path,)), responses((status = 200, description = "Industry with experts, case studies and insights"), (status = 404, description = "Not found")))]
pub async fn get_one(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<IndustryDetail>, ApiError> {
    Ok(response::ok(industry_service::get(&state.db, id).await?))
}

#[utoipa::path(get, path = "/api/industries/slug/{slug}", tag = "industries", params(("slug" = String, Path,)), responses((status = 200, description = "Industry detail"), (status = 404, description = "Not found")))]
pub async fn get_by_slug(
    State(state): State<ServerState>,
    AppPath(slug): AppPath<String>,
) -> Result<Reply<IndustryDetail>, ApiError> {
    Ok(response::ok(industry_service::get_by_slug(&state.db, &slug).await?))
}

#[utoipa::path(post, path = "/api/industries", tag = "industries", responses((status = 201, description = "Created"), (status = 400, description = "Validation failed or unknown experts"), (status = 409, description = "Slug taken")))]
pub async fn create(
    State(state): State<ServerState>,
    AppJson(input): AppJson<CreateIndustry>,
) -> Result<Reply<IndustryDetail>, ApiError> {
    let created = industry_service::create(&state.db, input).await?;
    Ok(response::created("Industry created successfully", created))
}

#[utoipa::path(patch, path = "/api/industries/{id}", tag = "industries", params(("id" = Uuid, Path,)), responses((status = 200, description = "Updated"), (status = 404, description = "Not found"), (status = 409, description = "Slug taken")))]
pub async fn update(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateIndustry>,
) -> Result<Reply<IndustryDetail>, ApiError> {
    let updated = industry_service::update(&state.db, id, input).await?;
    Ok(response::updated("Industry updated successfully", updated))
}

#[utoipa::path(delete, path = "/api/industries/{id}", tag = "industries", params(("id" = Uuid, Path,)), responses((status = 200, description = "Deleted with its case studies, insights and assignments"), (status = 404, description = "Not found")))]
pub async fn delete(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<()>, ApiError> {
    industry_service::delete(&state.db, id).await?;
    Ok(response::message("Industry deleted successfully"))
}

#[utoipa::path(patch, path = "/api/industries/{id}/toggle-status", tag = "industries", params(("id" = Uuid, Path,)), responses((status = 200, description = "Status flipped"), (status = 404, description = "Not found")))]
pub async fn toggle_status(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<industry::Model>, ApiError> {
    let industry = industry_service::toggle_status(&state.db, id).await?;
    Ok(response::updated("Industry status updated", industry))
}

#[utoipa::path(get, path = "/api/industries/{id}/experts", tag = "industries", params(("id" = Uuid, Path,)), responses((status = 200, description = "Assigned experts"), (status = 404, description = "Industry not found")))]
pub async fn experts(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<Vec<expert::Model>>, ApiError> {
    let owner = Owner::Industry(id);
    relation_service::ensure_owner(&state.db, owner).await?;
    Ok(response::ok(relation_service::experts_of(&state.db, owner).await?))
}

#[utoipa::path(post, path = "/api/industries/{id}/experts", tag = "industries", params(("id" = Uuid, Path,)), request_body = AssignExpertRequest, responses((status = 201, description = "Assigned"), (status = 404, description = "Industry or expert not found"), (status = 409, description = "Already assigned")))]
pub async fn assign_expert(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<AssignExpertRequest>,
) -> Result<Reply<()>, ApiError> {
    relation_service::attach(&state.db, Owner::Industry(id), body.expert_id).await?;
    Ok(response::message("Expert assigned to industry successfully").with_status(StatusCode::CREATED))
}

#[utoipa::path(delete, path = "/api/industries/{id}/experts/{expert_id}", tag = "industries", params(("id" = Uuid, Path,), ("expert_id" = Uuid, Path,)), responses((status = 200, description = "Unassigned"), (status = 404, description = "Industry not found or expert not assigned")))]
pub async fn unassign_expert(
    State(state): State<ServerState>,
    AppPath((id, expert_id)): AppPath<(Uuid, Uuid)>,
) -> Result<Reply<()>, ApiError> {
    relation_service::detach(&state.db, Owner::Industry(id), expert_id).await?;
    Ok(response::message("Expert removed from industry successfully"))
}

#[utoipa::path(get, path = "/api/industries/{id}/case-studies", tag = "industries", params(("id" = Uuid, Path,)), responses((status = 200, description = "Case studies of the industry"), (status = 404, description = "Industry not found")))]
pub async fn case_studies(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Reply<Vec<case_study::Model>>, ApiError> {
    Ok(response::ok(case_study_service::list_for_parent(&state.db, Owner::Industry(id)).await?))
}

#[utoipa::path(get, path = "/api/industries/{id}/insights", tag = "industries", params(("id" = Uuid, Path,)), responses((status = 200, description = "Insights of the industry"), (status = 404, description = "Industry not found")))]
pub async fn insights(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<Vec<insight::Model>>, ApiError> {
    Ok(response::ok(insight_service::list_for_industry(&state.db, id).await?))
}

#[utoipa::path(get, path = "/api/industries/{id}/stats", tag = "industries", params(("id" = Uuid, Path,)), responses((status = 200, description = "Expert, case study and insight counts"), (status = 404, description = "Not found")))]
pub async fn stats(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<IndustryStats>, ApiError> {
    Ok(response::ok(industry_service::stats(&state.db, id).await?))
}

#[utoipa::path(put, path = "/api/industries/reorder", tag = "industries", request_body = crate::openapi::ReorderRequest, responses((status = 200, description = "Reordered"), (status = 400, description = "Empty or duplicate ids"), (status = 404, description = "Unknown ids")))]
pub async fn reorder_industries(State(state): State<ServerState>, AppJson(body): AppJson<Value>) -> Result<Reply<()>, ApiError> {
    reorder::<industry::Entity>(&state, "industryIds", &body, "Industries reordered successfully").await
}
