use axum::{
    extract::State,
    routing::{get, patch, post, put},
    Router,
};
use serde_json::Value;
use uuid::Uuid;

use models::case_study;
use service::relation_service::Owner;
use service::services::case_study_service::{
    self, CaseStudyOverview, CaseStudyQuery, CreateCaseStudy, UpdateCaseStudy,
};

use crate::errors::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::response::{self, Reply};
use crate::routes::{reorder, LimitQuery};
use crate::state::ServerState;

pub fn public() -> Router<ServerState> {
    Router::new()
        .route("/api/case-studies", get(list))
        .route("/api/case-studies/featured/all", get(featured))
        .route("/api/case-studies/stats/overview", get(overview))
        .route("/api/case-studies/impact/:impact_level", get(by_impact))
        .route("/api/case-studies/industry/:industry_id", get(for_industry))
        .route("/api/case-studies/service/:service_id", get(for_service))
        .route("/api/case-studies/:id", get(get_one))
}

pub fn protected() -> Router<ServerState> {
    Router::new()
        .route("/api/case-studies", post(create))
        .route("/api/case-studies/reorder", put(reorder_case_studies))
        .route("/api/case-studies/:id", patch(update).delete(delete))
        .route("/api/case-studies/:id/toggle-status", patch(toggle_status))
}

#[utoipa::path(get, path = "/api/case-studies", tag = "case-studies", params(crate::openapi::ListQueryDoc, ("industryId" = Option<Uuid>, Query,), ("serviceId" = Option<Uuid>, Query,), ("impactLevel" = Option<String>, Query,)), responses((status = 200, description = "Paged case studies"), (status = 400, description = "Invalid query")))]
pub async fn list(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<CaseStudyQuery>,
) -> Result<Reply<Vec<case_study::Model>>, ApiError> {
    Ok(response::page(case_study_service::list(&state.db, &query).await?))
}

#[utoipa::path(get, path = "/api/case-studies/{id}", tag = "case-studies", params(("id" = Uuid, Path,)), responses((status = 200, description = "Case study"), (status = 404, description = "Not found")))]
pub async fn get_one(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<case_study::Model>, ApiError> {
    Ok(response::ok(case_study_service::get(&state.db, id).await?))
}

#[utoipa::path(get, path = "/api/case-studies/industry/{industry_id}", tag = "case-studies", params(("industry_id" = Uuid, Path,)), responses((status = 200, description = "Case studies of the industry; empty when the industry no longer exists")))]
pub async fn for_industry(
    State(state): State<ServerState>,
    AppPath(industry_id): AppPath<Uuid>,
) -> Result<Reply<Vec<case_study::Model>>, ApiError> {
    Ok(response::ok(case_study_service::list_for(&state.db, Owner::Industry(industry_id)).await?))
}

#[utoipa::path(get, path = "/api/case-studies/service/{service_id}", tag = "case-studies", params(("service_id" = Uuid, Path,)), responses((status = 200, description = "Case studies of the service; empty when the service no longer exists")))]
pub async fn for_service(
    State(state): State<ServerState>,
    AppPath(service_id): AppPath<Uuid>,
) -> Result<Reply<Vec<case_study::Model>>, ApiError> {
    Ok(response::ok(case_study_service::list_for(&state.db, Owner::Service(service_id)).await?))
}

#[utoipa::path(get, path = "/api/case-studies/impact/{impact_level}", tag = "case-studies", params(("impact_level" = String, Path, description = "Low, Medium, High or Transformational")), responses((status = 200, description = "Active case studies with this impact level"), (status = 400, description = "Unknown impact level")))]
pub async fn by_impact(
    State(state): State<ServerState>,
    AppPath(impact_level): AppPath<String>,
) -> Result<Reply<Vec<case_study::Model>>, ApiError> {
    Ok(response::ok(case_study_service::by_impact(&state.db, &impact_level).await?))
}

#[utoipa::path(get, path = "/api/case-studies/featured/all", tag = "case-studies", params(("limit" = Option<u64>, Query, description = "1..=20, default 6")), responses((status = 200, description = "Featured case studies"), (status = 400, description = "Invalid limit")))]
pub async fn featured(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<LimitQuery>,
) -> Result<Reply<Vec<case_study::Model>>, ApiError> {
    Ok(response::ok(case_study_service::featured(&state.db, query.limit.as_deref()).await?))
}

#[utoipa::path(get, path = "/api/case-studies/stats/overview", tag = "case-studies", responses((status = 200, description = "Totals by parent and impact level")))]
pub async fn overview(State(state): State<ServerState>) -> Result<Reply<CaseStudyOverview>, ApiError> {
    Ok(response::ok(case_study_service::overview(&state.db).await?))
}

#[utoipa::path(post, path = "/api/case-studies", tag = "case-studies", responses((status = 201, description = "Created"), (status = 400, description = "Validation failed"), (status = 404, description = "Industry or service not found")))]
pub async fn create(
    State(state): State<ServerState>,
    AppJson(input): AppJson<CreateCaseStudy>,
) -> Result<Reply<case_study::Model>, ApiError> {
    let created = case_study_service::create(&state.db, input).await?;
    Ok(response::created("Case study created successfully", created))
}

#[utoipa::path(patch, path = "/api/case-studies/{id}", tag = "case-studies", params(("id" = Uuid, Path,)), responses((status = 200, description = "Updated"), (status = 400, description = "Validation failed"), (status = 404, description = "Not found")))]
pub async fn update(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateCaseStudy>,
) -> Result<Reply<case_study::Model>, ApiError> {
    let updated = case_study_service::update(&state.db, id, input).await?;
    Ok(response::updated("Case study updated successfully", updated))
}

#[utoipa::path(delete, path = "/api/case-studies/{id}", tag = "case-studies", params(("id" = Uuid, Path,)), responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<()>, ApiError> {
    case_study_service::delete(&state.db, id).await?;
    Ok(response::message("Case study deleted successfully"))
}

#[utoipa::path(patch, path = "/api/case-studies/{id}/toggle-status", tag = "case-studies", params(("id" = Uuid, Path,)), responses((status = 200, description = "Status flipped"), (status = 404, description = "Not found")))]
pub async fn toggle_status(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Reply<case_study::Model>, ApiError> {
    let case_study = case_study_service::toggle_status(&state.db, id).await?;
    Ok(response::updated("Case study status updated", case_study))
}

#[utoipa::path(put, path = "/api/case-studies/reorder", tag = "case-studies", request_body = crate::openapi::ReorderRequest, responses((status = 200, description = "Reordered"), (status = 400, description = "Empty or duplicate ids"), (status = 404, description = "Unknown ids")))]
pub async fn reorder_case_studies(State(state): State<ServerState>, AppJson(body): AppJson<Value>) -> Result<Reply<()>, ApiError> {
    reorder::<case_study::Entity>(&state, "caseStudyIds", &body, "Case studies reordered successfully").await
}
