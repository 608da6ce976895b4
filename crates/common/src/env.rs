//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::info;

/// Ensure the upload directory exists and is writable by creating it when missing.
pub async fn ensure_upload_dir(upload_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(upload_dir).await.is_err() {
        info!(%upload_dir, "upload directory missing; creating it");
    }
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {upload_dir}: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_nested_upload_dir() {
        let base = std::env::temp_dir().join(format!("cms-env-{}", std::process::id()));
        let nested = base.join("a/b");
        let path = nested.to_string_lossy().to_string();
        ensure_upload_dir(&path).await.unwrap();
        assert!(tokio::fs::metadata(&nested).await.unwrap().is_dir());
        // idempotent
        ensure_upload_dir(&path).await.unwrap();
        let _ = tokio::fs::remove_dir_all(&base).await;
    }
}
