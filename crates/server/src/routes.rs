pub mod affiliations;
pub mod case_studies;
pub mod categories;
pub mod contact_messages;
pub mod experts;
pub mod industries;
pub mod insights;
pub mod leaders;
pub mod partners;
pub mod services;
pub mod stats;
pub mod testimonials;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use common::types::Health;
use service::ordering::{self, Ordered, ReorderPlan};

use crate::auth::require_bearer_token;
use crate::errors::ApiError;
use crate::metrics::{metrics, track_metrics};
use crate::openapi::ApiDoc;
use crate::response::{self, Reply};
use crate::state::ServerState;

/// Multipart framing on top of the largest accepted image.
const BODY_OVERHEAD: usize = 1024 * 1024;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignExpertRequest {
    pub expert_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Shared reorder handler body: `{ <field>: [id, ...] }` in, message out.
pub(crate) async fn reorder<E: Ordered>(
    state: &ServerState,
    field: &str,
    body: &Value,
    message: &str,
) -> Result<Reply<()>, ApiError> {
    let plan = ReorderPlan::from_body(field, body)?;
    ordering::reorder::<E>(&state.db, &plan).await?;
    Ok(response::message(message))
}

fn public_routes() -> Router<ServerState> {
    Router::new()
        .merge(categories::public())
        .merge(services::public())
        .merge(industries::public())
        .merge(experts::public())
        .merge(leaders::public())
        .merge(case_studies::public())
        .merge(insights::public())
        .merge(partners::public())
        .merge(testimonials::public())
        .merge(affiliations::public())
        .merge(contact_messages::public())
}

fn protected_routes(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .merge(categories::protected())
        .merge(services::protected())
        .merge(industries::protected())
        .merge(experts::protected())
        .merge(leaders::protected())
        .merge(case_studies::protected())
        .merge(insights::protected())
        .merge(partners::protected())
        .merge(testimonials::protected())
        .merge(affiliations::protected())
        .merge(contact_messages::protected())
        .merge(stats::protected())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer_token))
}

/// Build the full application router. Public and protected routers share
/// paths; axum merges their method routers so only the mutating methods sit
/// behind the token check.
pub fn build_router(state: ServerState, cors: CorsLayer, upload_dir: &str, max_upload_bytes: usize) -> Router {
    let api = public_routes()
        .merge(protected_routes(&state))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route_layer(middleware::from_fn_with_state(state.clone(), track_metrics));

    api.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes + BODY_OVERHEAD))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx and handler failures
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
