//! HTTP surface of the CMS: axum routes, bearer-token guard, request
//! extractors and the JSON envelope.

pub mod auth;
pub mod errors;
pub mod extract;
pub mod metrics;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod startup;
pub mod state;

pub use startup::{build_app, build_state, run};
pub use state::{ServerAuthConfig, ServerState};
