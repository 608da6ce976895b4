use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::ApiError;
use crate::state::ServerState;

/// Record method, matched route and status for every routed request.
pub async fn track_metrics(State(state): State<ServerState>, req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".into());
    let response = next.run(req).await;
    state
        .metrics
        .observe(&method, &route, response.status().as_u16(), started.elapsed().as_secs_f64());
    response
}

pub async fn metrics(State(state): State<ServerState>) -> Result<Response, ApiError> {
    let body = state.metrics.encode().map_err(|e| {
        tracing::error!(error = %e, "encode metrics failed");
        ApiError::internal()
    })?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response())
}
