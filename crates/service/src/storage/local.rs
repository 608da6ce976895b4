use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{error, info};
use uuid::Uuid;

use super::{extension_for, ImageStore, UploadedImage};
use crate::errors::ServiceError;

/// Writes images into a local directory that the HTTP layer serves statically.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
    public_base_url: String,
    max_bytes: usize,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    pub fn from_config(cfg: &configs::UploadsConfig) -> Self {
        Self::new(&cfg.dir, &cfg.public_base_url, cfg.max_bytes)
    }

    fn check(&self, image: &UploadedImage) -> Result<&'static str, ServiceError> {
        let Some(ext) = extension_for(&image.content_type) else {
            return Err(ServiceError::invalid(
                &image.field,
                "Only PNG, JPEG, GIF, WebP and SVG images are allowed",
            ));
        };
        if image.bytes.is_empty() {
            return Err(ServiceError::invalid(&image.field, "Uploaded image is empty"));
        }
        if image.bytes.len() > self.max_bytes {
            return Err(ServiceError::invalid(
                &image.field,
                format!("Image must be at most {} bytes", self.max_bytes),
            ));
        }
        Ok(ext)
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn put(&self, image: UploadedImage) -> Result<String, ServiceError> {
        let ext = self.check(&image)?;
        let name = format!("{}.{}", Uuid::new_v4(), ext);
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            error!(dir = %self.dir.display(), err = %e, "cannot create upload dir");
            ServiceError::Storage(e.to_string())
        })?;
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &image.bytes).await.map_err(|e| {
            error!(path = %path.display(), err = %e, "image write failed");
            ServiceError::Storage(e.to_string())
        })?;
        info!(file = %name, bytes = image.bytes.len(), original = ?image.file_name, "image stored");
        Ok(format!("{}/{}", self.public_base_url, name))
    }

    async fn remove(&self, url: &str) -> Result<(), ServiceError> {
        // only plain file names this store handed out
        let name = url
            .strip_prefix(self.public_base_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && name != &"..")
            .ok_or_else(|| ServiceError::Storage(format!("not a local upload: {url}")))?;
        let path = self.dir.join(name);
        tokio::fs::remove_file(&path).await.map_err(|e| {
            error!(path = %path.display(), err = %e, "image removal failed");
            ServiceError::Storage(e.to_string())
        })?;
        info!(file = %name, "image removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(content_type: &str, len: usize) -> UploadedImage {
        UploadedImage {
            field: "image".into(),
            file_name: Some("photo".into()),
            content_type: content_type.into(),
            bytes: vec![7u8; len],
        }
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("cms-uploads-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn stores_file_and_returns_public_url() {
        let dir = temp_dir();
        let store = LocalImageStore::new(&dir, "https://cdn.example.com/media/", 1024);
        let url = store.put(image("image/png", 16)).await.unwrap();
        assert!(url.starts_with("https://cdn.example.com/media/"));
        assert!(url.ends_with(".png"));
        let name = url.rsplit('/').next().unwrap();
        let written = tokio::fs::read(dir.join(name)).await.unwrap();
        assert_eq!(written.len(), 16);
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn removes_only_its_own_files() {
        let dir = temp_dir();
        let store = LocalImageStore::new(&dir, "/uploads", 1024);
        let url = store.put(image("image/webp", 4)).await.unwrap();
        store.remove(&url).await.unwrap();
        let name = url.rsplit('/').next().unwrap();
        assert!(tokio::fs::metadata(dir.join(name)).await.is_err());

        for foreign in ["https://cdn.example.com/a.png", "/uploads/../secret", "/uploads/"] {
            assert!(matches!(store.remove(foreign).await, Err(ServiceError::Storage(_))), "{foreign}");
        }
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn rejects_non_images_and_oversized_files() {
        let store = LocalImageStore::new(temp_dir(), "/uploads", 8);
        let err = store.put(image("application/pdf", 4)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = store.put(image("image/jpeg", 9)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = store.put(image("image/jpeg", 0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
