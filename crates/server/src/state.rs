use std::sync::Arc;

use common::metrics::HttpMetrics;
use sea_orm::DatabaseConnection;
use service::storage::ImageStore;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

/// Shared handler state; cheap to clone.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    pub images: Arc<dyn ImageStore>,
    pub metrics: Arc<HttpMetrics>,
}
