use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete as delete_route, get, patch, post, put},
    Router,
};
use serde_json::Value;
use uuid::Uuid;

use models::{case_study, expert, service as service_model};
use service::relation_service::{self, Owner};
use service::services::case_study_service;
use service::services::catalog_service::{
    self, CreateService, ServiceDetail, ServiceQuery, ServiceStats, ServiceSummary, UpdateService,
};

use crate::errors::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::response::{self, Reply};
use crate::routes::{reorder, AssignExpertRequest};
use crate::state::ServerState;

pub fn public() -> Router<ServerState> {
    Router::new()
        .route("/api/services", get(list))
        .route("/api/services/slug/:slug", get(get_by_slug))
        .route("/api/services/:id", get(get_one))
        .route("/api/services/:id/experts", get(experts))
        .route("/api/services/:id/case-studies", get(case_studies))
        .route("/api/services/:id/stats", get(stats))
}

pub fn protected() -> Router<ServerState> {
    Router::new()
        .route("/api/services", post(create))
        .route("/api/services/reorder", put(reorder_services))
        .route("/api/services/:id", patch(update).delete(delete))
        .route("/api/services/:id/toggle-status", patch(toggle_status))
        .route("/api/services/:id/experts", post(assign_expert))
        .route("/api/services/:id/experts/:expert_id", delete_route(unassign_expert))
}

#[utoipa::path(get, path = "/api/services", tag = "services", params(crate::openapi::ListQueryDoc, ("category" = Option<String>, Query, description = "Category slug")), responses((status = 200, description = "Paged services with their category")))]
pub async fn list(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<ServiceQuery>,
) -> Result<Reply<Vec<ServiceSummary>>, ApiError> {
    Ok(response::page(catalog_service::list(&state.db, &query).await?))
}

#[utoipa::path(get, path = "/api/services/{id}", tag = "services", params(("id" = Uuid, Path,)), responses((status = 200, description = "Service with category, experts and case studies"), (status = 404, description = "Not found")))]
pub async fn get_one(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<ServiceDetail>, ApiError> {
    Ok(response::ok(catalog_service::get(&state.db, id).await?))
}

#[utoipa::path(get, path = "/api/services/slug/{slug}", tag = "services", params(("slug" = String, Path,)), responses((status = 200, description = "Service detail"), (status = 404, description = "Not found")))]
pub async fn get_by_slug(
    State(state): State<ServerState>,
    AppPath(slug): AppPath<String>,
) -> Result<Reply<ServiceDetail>, ApiError> {
    Ok(response::ok(catalog_service::get_by_slug(&state.db, &slug).await?))
}

#[utoipa::path(post, path = "/api/services", tag = "services", responses((status = 201, description = "Created"), (status = 400, description = "Validation failed or unknown category/experts"), (status = 409, description = "Slug taken")))]
pub async fn create(
    State(state): State<ServerState>,
    AppJson(input): AppJson<CreateService>,
) -> Result<Reply<ServiceDetail>, ApiError> {
    let created = catalog_service::create(&state.db, input).await?;
    Ok(response::created("Service created successfully", created))
}

#[utoipa::path(patch, path = "/api/services/{id}", tag = "services", params(("id" = Uuid, Path,)), responses((status = 200, description = "Updated"), (status = 404, description = "Not found"), (status = 409, description = "Slug taken")))]
pub async fn update(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateService>,
) -> Result<Reply<ServiceDetail>, ApiError> {
    let updated = catalog_service::update(&state.db, id, input).await?;
    Ok(response::updated("Service updated successfully", updated))
}

#[utoipa::path(delete, path = "/api/services/{id}", tag = "services", params(("id" = Uuid, Path,)), responses((status = 200, description = "Deleted with its case studies and assignments"), (status = 404, description = "Not found")))]
pub async fn delete(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<()>, ApiError> {
    catalog_service::delete(&state.db, id).await?;
    Ok(response::message("Service deleted successfully"))
}

#[utoipa::path(patch, path = "/api/services/{id}/toggle-status", tag = "services", params(("id" = Uuid, Path,)), responses((status = 200, description = "Status flipped"), (status = 404, description = "Not found")))]
pub async fn toggle_status(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<service_model::Model>, ApiError> {
    let service = catalog_service::toggle_status(&state.db, id).await?;
    Ok(response::updated("Service status updated", service))
}

#[utoipa::path(get, path = "/api/services/{id}/experts", tag = "services", params(("id" = Uuid, Path,)), responses((status = 200, description = "Assigned experts"), (status = 404, description = "Service not found")))]
pub async fn experts(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<Vec<expert::Model>>, ApiError> {
    let owner = Owner::Service(id);
    relation_service::ensure_owner(&state.db, owner).await?;
    Ok(response::ok(relation_service::experts_of(&state.db, owner).await?))
}

#[utoipa::path(post, path = "/api/services/{id}/experts", tag = "services", params(("id" = Uuid, Path,)), request_body = AssignExpertRequest, responses((status = 201, description = "Assigned"), (status = 404, description = "Service or expert not found"), (status = 409, description = "Already assigned")))]
pub async fn assign_expert(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<AssignExpertRequest>,
) -> Result<Reply<()>, ApiError> {
    relation_service::attach(&state.db, Owner::Service(id), body.expert_id).await?;
    Ok(response::message("Expert assigned to service successfully").with_status(StatusCode::CREATED))
}

#[utoipa::path(delete, path = "/api/services/{id}/experts/{expert_id}", tag = "services", params(("id" = Uuid, Path,), ("expert_id" = Uuid, Path,)), responses((status = 200, description = "Unassigned"), (status = 404, description = "Service not found or expert not assigned")))]
pub async fn unassign_expert(
    State(state): State<ServerState>,
    AppPath((id, expert_id)): AppPath<(Uuid, Uuid)>,
) -> Result<Reply<()>, ApiError> {
    relation_service::detach(&state.db, Owner::Service(id), expert_id).await?;
    Ok(response::message("Expert removed from service successfully"))
}

#[utoipa::path(get, path = "/api/services/{id}/case-studies", tag = "services", params(("id" = Uuid, Path,)), responses((status = 200, description = "Case studies of the service"), (status = 404, description = "Service not found")))]
pub async fn case_studies(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Reply<Vec<case_study::Model>>, ApiError> {
    Ok(response::ok(case_study_service::list_for_parent(&state.db, Owner::Service(id)).await?))
}

#[utoipa::path(get, path = "/api/services/{id}/stats", tag = "services", params(("id" = Uuid, Path,)), responses((status = 200, description = "Expert and case study counts"), (status = 404, description = "Not found")))]
pub async fn stats(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<ServiceStats>, ApiError> {
    Ok(response::ok(catalog_service::stats(&state.db, id).await?))
}

#[utoipa::path(put, path = "/api/services/reorder", tag = "services", request_body = crate::openapi::ReorderRequest, responses((status = 200, description = "Reordered"), (status = 400, description = "Empty or duplicate ids"), (status = 404, description = "Unknown ids")))]
pub async fn reorder_services(State(state): State<ServerState>, AppJson(body): AppJson<Value>) -> Result<Reply<()>, ApiError> {
    reorder::<service_model::Entity>(&state, "serviceIds", &body, "Services reordered successfully").await
}
