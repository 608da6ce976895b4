use axum::{
    extract::State,
    routing::{get, patch, post, put},
    Router,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use models::insight;
use service::services::insight_service::{self, CreateInsight, InsightQuery, UpdateInsight};

use crate::errors::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery, FormOrJson};
use crate::response::{self, Reply};
use crate::routes::{reorder, LimitQuery};
use crate::state::ServerState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCount {
    pub view_count: i32,
}

pub fn public() -> Router<ServerState> {
    Router::new()
        .route("/api/insights", get(list))
        .route("/api/insights/popular/all", get(popular))
        .route("/api/insights/recent/all", get(recent))
        .route("/api/insights/industry/:industry_id", get(for_industry))
        .route("/api/insights/:id", get(get_one))
        .route("/api/insights/:id/view", post(record_view))
}

pub fn protected() -> Router<ServerState> {
    Router::new()
        .route("/api/insights", post(create))
        .route("/api/insights/reorder", put(reorder_insights))
        .route("/api/insights/:id", patch(update).delete(delete))
        .route("/api/insights/:id/toggle-status", patch(toggle_status))
}

#[utoipa::path(get, path = "/api/insights", tag = "insights", params(crate::openapi::ListQueryDoc, ("industryId" = Option<Uuid>, Query,)), responses((status = 200, description = "Paged insights"), (status = 400, description = "Invalid query")))]
pub async fn list(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<InsightQuery>,
) -> Result<Reply<Vec<insight::Model>>, ApiError> {
    Ok(response::page(insight_service::list(&state.db, &query).await?))
}

#[utoipa::path(get, path = "/api/insights/{id}", tag = "insights", params(("id" = Uuid, Path,)), responses((status = 200, description = "Insight"), (status = 404, description = "Not found")))]
pub async fn get_one(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<insight::Model>, ApiError> {
    Ok(response::ok(insight_service::get(&state.db, id).await?))
}

#[utoipa::path(get, path = "/api/insights/industry/{industry_id}", tag = "insights", params(("industry_id" = Uuid, Path,)), responses((status = 200, description = "Insights of the industry"), (status = 404, description = "Industry not found")))]
pub async fn for_industry(
    State(state): State<ServerState>,
    AppPath(industry_id): AppPath<Uuid>,
) -> Result<Reply<Vec<insight::Model>>, ApiError> {
    Ok(response::ok(insight_service::list_for_industry(&state.db, industry_id).await?))
}

#[utoipa::path(get, path = "/api/insights/popular/all", tag = "insights", params(("limit" = Option<u64>, Query, description = "1..=50, default 5")), responses((status = 200, description = "Most viewed active insights"), (status = 400, description = "Invalid limit")))]
pub async fn popular(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<LimitQuery>,
) -> Result<Reply<Vec<insight::Model>>, ApiError> {
    Ok(response::ok(insight_service::popular(&state.db, query.limit.as_deref()).await?))
}

#[utoipa::path(get, path = "/api/insights/recent/all", tag = "insights", params(("limit" = Option<u64>, Query, description = "1..=50, default 5")), responses((status = 200, description = "Newest active insights"), (status = 400, description = "Invalid limit")))]
pub async fn recent(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<LimitQuery>,
) -> Result<Reply<Vec<insight::Model>>, ApiError> {
    Ok(response::ok(insight_service::recent(&state.db, query.limit.as_deref()).await?))
}

#[utoipa::path(post, path = "/api/insights/{id}/view", tag = "insights", params(("id" = Uuid, Path,)), responses((status = 200, description = "New view count"), (status = 404, description = "Not found")))]
pub async fn record_view(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<ViewCount>, ApiError> {
    let view_count = insight_service::record_view(&state.db, id).await?;
    Ok(response::ok(ViewCount { view_count }))
}

#[utoipa::path(post, path = "/api/insights", tag = "insights", responses((status = 201, description = "Created"), (status = 400, description = "Validation failed"), (status = 404, description = "Industry not found")))]
pub async fn create(State(state): State<ServerState>, form: FormOrJson<CreateInsight>) -> Result<Reply<insight::Model>, ApiError> {
    let created = insight_service::create(&state.db, state.images.as_ref(), form.data, form.upload).await?;
    Ok(response::created("Insight created successfully", created))
}

#[utoipa::path(patch, path = "/api/insights/{id}", tag = "insights", params(("id" = Uuid, Path,)), responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
    form: FormOrJson<UpdateInsight>,
) -> Result<Reply<insight::Model>, ApiError> {
    let updated = insight_service::update(&state.db, state.images.as_ref(), id, form.data, form.upload).await?;
    Ok(response::updated("Insight updated successfully", updated))
}

#[utoipa::path(delete, path = "/api/insights/{id}", tag = "insights", params(("id" = Uuid, Path,)), responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<()>, ApiError> {
    insight_service::delete(&state.db, id).await?;
    Ok(response::message("Insight deleted successfully"))
}

#[utoipa::path(patch, path = "/api/insights/{id}/toggle-status", tag = "insights", params(("id" = Uuid, Path,)), responses((status = 200, description = "Status flipped"), (status = 404, description = "Not found")))]
pub async fn toggle_status(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<insight::Model>, ApiError> {
    let insight = insight_service::toggle_status(&state.db, id).await?;
    Ok(response::updated("Insight status updated", insight))
}

#[utoipa::path(put, path = "/api/insights/reorder", tag = "insights", request_body = crate::openapi::ReorderRequest, responses((status = 200, description = "Reordered"), (status = 400, description = "Empty or duplicate ids"), (status = 404, description = "Unknown ids")))]
pub async fn reorder_insights(State(state): State<ServerState>, AppJson(body): AppJson<Value>) -> Result<Reply<()>, ApiError> {
    reorder::<insight::Entity>(&state, "insightIds", &body, "Insights reordered successfully").await
}
