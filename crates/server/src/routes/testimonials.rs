use axum::{
    extract::State,
    routing::{get, patch, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use models::testimonial;
use service::services::testimonial_service::{self, TestimonialInput, TestimonialQuery};

use crate::errors::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery, FormOrJson};
use crate::response::{self, Reply};
use crate::routes::reorder;
use crate::state::ServerState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApprovalRequest {
    pub approved: bool,
}

/// Submission is public; everything else needs a token.
pub fn public() -> Router<ServerState> {
    Router::new()
        .route("/api/testimonials", get(list).post(submit))
        .route("/api/testimonials/:id", get(get_one))
}

pub fn protected() -> Router<ServerState> {
    Router::new()
        .route("/api/testimonials/reorder", put(reorder_testimonials))
        .route("/api/testimonials/:id", patch(update).delete(delete))
        .route("/api/testimonials/:id/approval", patch(set_approval))
}

#[utoipa::path(get, path = "/api/testimonials", tag = "testimonials", params(crate::openapi::ListQueryDoc, ("approved" = Option<bool>, Query,)), responses((status = 200, description = "Paged testimonials")))]
pub async fn list(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<TestimonialQuery>,
) -> Result<Reply<Vec<testimonial::Model>>, ApiError> {
    Ok(response::page(testimonial_service::list(&state.db, &query).await?))
}

#[utoipa::path(get, path = "/api/testimonials/{id}", tag = "testimonials", params(("id" = Uuid, Path,)), responses((status = 200, description = "Testimonial"), (status = 404, description = "Not found")))]
pub async fn get_one(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<testimonial::Model>, ApiError> {
    Ok(response::ok(testimonial_service::get(&state.db, id).await?))
}

#[utoipa::path(post, path = "/api/testimonials", tag = "testimonials", responses((status = 201, description = "Submitted for approval"), (status = 400, description = "Validation failed")))]
pub async fn submit(
    State(state): State<ServerState>,
    form: FormOrJson<TestimonialInput>,
) -> Result<Reply<testimonial::Model>, ApiError> {
    let created = testimonial_service::submit(&state.db, state.images.as_ref(), form.data, form.upload).await?;
    Ok(response::created("Testimonial submitted successfully and is pending approval", created))
}

#[utoipa::path(patch, path = "/api/testimonials/{id}", tag = "testimonials", params(("id" = Uuid, Path,)), responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
    form: FormOrJson<TestimonialInput>,
) -> Result<Reply<testimonial::Model>, ApiError> {
    let updated = testimonial_service::update(&state.db, state.images.as_ref(), id, form.data, form.upload).await?;
    Ok(response::updated("Testimonial updated successfully", updated))
}

#[utoipa::path(patch, path = "/api/testimonials/{id}/approval", tag = "testimonials", params(("id" = Uuid, Path,)), request_body = ApprovalRequest, responses((status = 200, description = "Approval changed"), (status = 404, description = "Not found")))]
pub async fn set_approval(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<ApprovalRequest>,
) -> Result<Reply<testimonial::Model>, ApiError> {
    let updated = testimonial_service::set_approval(&state.db, id, body.approved).await?;
    let message = if body.approved { "Testimonial approved" } else { "Testimonial unapproved" };
    Ok(response::updated(message, updated))
}

#[utoipa::path(delete, path = "/api/testimonials/{id}", tag = "testimonials", params(("id" = Uuid, Path,)), responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<()>, ApiError> {
    testimonial_service::delete(&state.db, id).await?;
    Ok(response::message("Testimonial deleted successfully"))
}

#[utoipa::path(put, path = "/api/testimonials/reorder", tag = "testimonials", request_body = crate::openapi::ReorderRequest, responses((status = 200, description = "Reordered"), (status = 400, description = "Empty or duplicate ids"), (status = 404, description = "Unknown ids")))]
pub async fn reorder_testimonials(State(state): State<ServerState>, AppJson(body): AppJson<Value>) -> Result<Reply<()>, ApiError> {
    reorder::<testimonial::Entity>(&state, "testimonialIds", &body, "Testimonials reordered successfully").await
}
