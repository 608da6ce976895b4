use axum::{
    extract::State,
    routing::{get, patch, post, put},
    Router,
};
use serde_json::Value;
use uuid::Uuid;

use models::partner;
use service::pagination::ListQuery;
use service::services::partner_service::{self, PartnerInput};

use crate::errors::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery, FormOrJson};
use crate::response::{self, Reply};
use crate::routes::reorder;
use crate::state::ServerState;

pub fn public() -> Router<ServerState> {
    Router::new()
        .route("/api/partners", get(list))
        .route("/api/partners/:id", get(get_one))
}

pub fn protected() -> Router<ServerState> {
    Router::new()
        .route("/api/partners", post(create))
        .route("/api/partners/reorder", put(reorder_partners))
        .route("/api/partners/:id", patch(update).delete(delete))
}

#[utoipa::path(get, path = "/api/partners", tag = "partners", params(crate::openapi::ListQueryDoc), responses((status = 200, description = "Paged partners")))]
pub async fn list(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Reply<Vec<partner::Model>>, ApiError> {
    Ok(response::page(partner_service::list(&state.db, &query).await?))
}

#[utoipa::path(get, path = "/api/partners/{id}", tag = "partners", params(("id" = Uuid, Path,)), responses((status = 200, description = "Partner"), (status = 404, description = "Not found")))]
pub async fn get_one(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<partner::Model>, ApiError> {
    Ok(response::ok(partner_service::get(&state.db, id).await?))
}

#[utoipa::path(post, path = "/api/partners", tag = "partners", responses((status = 201, description = "Created"), (status = 400, description = "Name and image are required")))]
pub async fn create(State(state): State<ServerState>, form: FormOrJson<PartnerInput>) -> Result<Reply<partner::Model>, ApiError> {
    let created = partner_service::create(&state.db, state.images.as_ref(), form.data, form.upload).await?;
    Ok(response::created("Partner created successfully", created))
}

#[utoipa::path(patch, path = "/api/partners/{id}", tag = "partners", params(("id" = Uuid, Path,)), responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
    form: FormOrJson<PartnerInput>,
) -> Result<Reply<partner::Model>, ApiError> {
    let updated = partner_service::update(&state.db, state.images.as_ref(), id, form.data, form.upload).await?;
    Ok(response::updated("Partner updated successfully", updated))
}

#[utoipa::path(delete, path = "/api/partners/{id}", tag = "partners", params(("id" = Uuid, Path,)), responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<()>, ApiError> {
    partner_service::delete(&state.db, id).await?;
    Ok(response::message("Partner deleted successfully"))
}

#[utoipa::path(put, path = "/api/partners/reorder", tag = "partners", request_body = crate::openapi::ReorderRequest, responses((status = 200, description = "Reordered"), (status = 400, description = "Empty or duplicate ids"), (status = 404, description = "Unknown ids")))]
pub async fn reorder_partners(State(state): State<ServerState>, AppJson(body): AppJson<Value>) -> Result<Reply<()>, ApiError> {
    reorder::<partner::Entity>(&state, "partnerIds", &body, "Partners reordered successfully").await
}
