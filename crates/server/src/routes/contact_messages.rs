use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use models::contact_message;
use service::services::contact_message_service::{
    self, ContactMessageQuery, CreateContactMessage, UpdateContactMessage,
};

use crate::errors::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::response::{self, Reply};
use crate::state::ServerState;

pub fn public() -> Router<ServerState> {
    Router::new().route("/api/contact-messages", post(create))
}

/// Reading and managing the inbox is admin-only.
pub fn protected() -> Router<ServerState> {
    Router::new()
        .route("/api/contact-messages", get(list))
        .route("/api/contact-messages/:id", get(get_one).patch(update).delete(delete))
}

#[utoipa::path(post, path = "/api/contact-messages", tag = "contact", request_body = crate::openapi::ContactMessageRequest, responses((status = 201, description = "Message received"), (status = 400, description = "Validation failed")))]
pub async fn create(
    State(state): State<ServerState>,
    AppJson(input): AppJson<CreateContactMessage>,
) -> Result<Reply<contact_message::Model>, ApiError> {
    let created = contact_message_service::create(&state.db, input).await?;
    Ok(response::created("Thank you for your message. We will get back to you soon.", created))
}

#[utoipa::path(get, path = "/api/contact-messages", tag = "contact", params(crate::openapi::ListQueryDoc, ("responded" = Option<bool>, Query,)), responses((status = 200, description = "Paged messages"), (status = 401, description = "Unauthorized")))]
pub async fn list(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<ContactMessageQuery>,
) -> Result<Reply<Vec<contact_message::Model>>, ApiError> {
    Ok(response::page(contact_message_service::list(&state.db, &query).await?))
}

#[utoipa::path(get, path = "/api/contact-messages/{id}", tag = "contact", params(("id" = Uuid, Path,)), responses((status = 200, description = "Message"), (status = 404, description = "Not found")))]
pub async fn get_one(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Reply<contact_message::Model>, ApiError> {
    Ok(response::ok(contact_message_service::get(&state.db, id).await?))
}

#[utoipa::path(patch, path = "/api/contact-messages/{id}", tag = "contact", params(("id" = Uuid, Path,)), responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update(
    State(state): State<ServerState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateContactMessage>,
) -> Result<Reply<contact_message::Model>, ApiError> {
    let updated = contact_message_service::update(&state.db, id, input).await?;
    Ok(response::updated("Message updated successfully", updated))
}

#[utoipa::path(delete, path = "/api/contact-messages/{id}", tag = "contact", params(("id" = Uuid, Path,)), responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete(State(state): State<ServerState>, AppPath(id): AppPath<Uuid>) -> Result<Reply<()>, ApiError> {
    contact_message_service::delete(&state.db, id).await?;
    Ok(response::message("Message deleted successfully"))
}
