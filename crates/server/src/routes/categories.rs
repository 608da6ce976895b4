use axum::{
    extract::State,
    routing::{get, patch, post, put},
    Router,
};
use serde_json::Value;
use uuid::Uuid;

use models::service_category;
use service::services::category_service::{self, CreateCategory, UpdateCategory};

use crate::errors::ApiError;
use crate::extract::{AppJson, AppPath};
use crate::response::{self, Reply};
use crate::routes::reorder;
use crate::state::ServerState;

pub fn public() -> Router<ServerState> {
    Router::new()
        .route("/api/services/categories/all", get(list_all))
        .route("/api/services/categories/:id", get(get_one))
}

pub fn protected() -> Router<ServerState> {
    Router::new()
        .route("/api/services/categories", post(create))
        .route("/api/services/categories/reorder", put(reorder_categories))
        .route("/api/services/categories/:id", patch(update).delete(delete))
}

#[utoipa::path(get, path = "/api/services/categories/all", tag = "categories", responses((status = 200, description = "All categories by position")))]
pub async fn list_all(State(state): State<ServerState>) -> Result<Reply<Vec<service_category::Model>>, ApiError> {
    Ok(response::ok(category_service::list_all(&state.db).await?))
}

#[utoipa::path(get, path = "/api/services/categories/{id}", tag = "categories", params(("id" = Uuid, Path,)), responses((status = 200, description = "Category"), (status = 404, description = "Not found")))]
pub async fn get_one(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Reply<service_category::Model>, ApiError> {
    Ok(response::ok(category_service::get(&state.db, id).await?))
}

#[utoipa::path(post, path = "/api/services/categories", tag = "categories", request_body = crate::openapi::CategoryRequest, responses((status = 201, description = "Created"), (status = 400, description = "Validation failed"), (status = 409, description = "Slug taken")))]
pub async fn create(
    State(state): State<ServerState>,
    AppJson(input): AppJson<CreateCategory>,
) -> Result<Reply<service_category::Model>, ApiError> {
    let created = category_service::create(&state.db, input).await?;
    Ok(response::created("Category created successfully", created))
}

#[utoipa::path(patch, path = "/api/services/categories/{id}", tag = "categories", params(("id" = Uuid, Path,)), request_body = crate::openapi::CategoryRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not found"), (status = 409, description = "Slug taken")))]
pub async fn update(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateCategory>,
) -> Result<Reply<service_category::Model>, ApiError> {
    let updated = category_service::update(&state.db, id, input).await?;
    Ok(response::updated("Category updated successfully", updated))
}

#[utoipa::path(delete, path = "/api/services/categories/{id}", tag = "categories", params(("id" = Uuid, Path,)), responses((status = 200, description = "Deleted"), (status = 404, description = "Not found"), (status = 409, description = "Still referenced by services")))]
pub async fn delete(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<()>, ApiError> {
    category_service::delete(&state.db, id).await?;
    Ok(response::message("Category deleted successfully"))
}

#[utoipa::path(put, path = "/api/services/categories/reorder", tag = "categories", request_body = crate::openapi::ReorderRequest, responses((status = 200, description = "Reordered"), (status = 400, description = "Empty or duplicate ids"), (status = 404, description = "Unknown ids")))]
pub async fn reorder_categories(State(state): State<ServerState>, AppJson(body): AppJson<Value>) -> Result<Reply<()>, ApiError> {
    reorder::<service_category::Entity>(&state, "categoryIds", &body, "Categories reordered successfully").await
}
