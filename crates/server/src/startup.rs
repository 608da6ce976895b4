use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::metrics::HttpMetrics;
use configs::AppConfig;
use migration::{Migrator, MigratorTrait};
use service::storage::LocalImageStore;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::{ServerAuthConfig, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Connect, migrate and assemble the shared handler state.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.auto_migrate {
        Migrator::up(&db, None).await?;
        info!("database migrations applied");
    }

    common::env::ensure_upload_dir(&cfg.uploads.dir).await?;
    let images = LocalImageStore::from_config(&cfg.uploads);
    let metrics = HttpMetrics::new().map_err(|e| StartupError::Runtime(format!("metrics registry: {e}")))?;

    Ok(ServerState {
        db,
        auth: ServerAuthConfig { jwt_secret: cfg.auth.jwt_secret.clone() },
        images: Arc::new(images),
        metrics: Arc::new(metrics),
    })
}

pub fn build_app(state: ServerState, cfg: &AppConfig) -> Router {
    routes::build_router(state, build_cors(), &cfg.uploads.dir, cfg.uploads.max_bytes)
}

/// Public entry: build the app and run the HTTP server until the task is dropped.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let addr = bind_addr(&cfg)?;
    let state = build_state(&cfg).await?;
    let app = build_app(state, &cfg);

    info!(%addr, "starting cms server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_rejects_bad_hosts() {
        let mut cfg = AppConfig::default();
        assert_eq!(bind_addr(&cfg).unwrap().port(), 8081);
        cfg.server.host = "not a host".into();
        assert!(matches!(bind_addr(&cfg), Err(StartupError::InvalidConfig(_))));
    }
}
