//! Bearer-token guard for mutating and admin routes.
//!
//! Tokens are issued elsewhere; here they are only verified (HS256, `exp`
//! required) against the configured secret.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::ApiError;
use crate::state::ServerState;

const COOKIE_NAME: &str = "auth_token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub iat: Option<usize>,
}

/// Bearer token from `Authorization`, else from the `auth_token` cookie.
fn extract_token(req: &Request) -> Result<Option<String>, ApiError> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| ApiError::unauthorized("Invalid Authorization header"))?;
        return match value.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            _ => Err(ApiError::unauthorized("Invalid Authorization header, expected Bearer token")),
        };
    }
    let cookies = req
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'));
    for part in cookies {
        if let Some(token) = part.trim().strip_prefix("auth_token=") {
            if !token.is_empty() {
                return Ok(Some(token.to_string()));
            }
        }
    }
    Ok(None)
}

pub fn verify(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(token, &key, &validation).map(|data| data.claims)
}

/// Route-layer middleware: 401 unless a valid token is presented. The decoded
/// claims are stored in the request extensions.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_string();
    let Some(token) = extract_token(&req).inspect_err(|_| warn!(%path, "malformed Authorization header"))? else {
        warn!(%path, "missing Authorization header and {COOKIE_NAME} cookie");
        return Err(ApiError::unauthorized("Authentication required"));
    };
    match verify(&token, &state.auth.jwt_secret) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(%path, error = %e, "token verification failed");
            Err(ApiError::unauthorized("Invalid or expired token"))
        }
    }
}
