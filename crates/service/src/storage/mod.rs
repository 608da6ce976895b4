//! Storage for uploaded images.
//!
//! Handlers hand the raw upload to an [`ImageStore`] and persist only the
//! returned URL on the entity.

pub mod local;

use async_trait::async_trait;
use tracing::warn;

use crate::errors::ServiceError;

pub use local::LocalImageStore;

/// An image received from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist the image and return the URL clients should use to fetch it.
    async fn put(&self, image: UploadedImage) -> Result<String, ServiceError>;

    /// Drop an image previously returned by [`ImageStore::put`].
    async fn remove(&self, url: &str) -> Result<(), ServiceError>;
}

/// File extension for the accepted image content types.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type.to_ascii_lowercase().as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    }
}

/// The image URL for one write. An uploaded file wins over a URL given in the
/// body; it is stored before the write starts and removed again when the
/// write does not go through.
#[derive(Debug)]
pub struct PendingImage {
    url: Option<String>,
    uploaded: bool,
}

impl PendingImage {
    pub async fn resolve(
        store: &dyn ImageStore,
        upload: Option<UploadedImage>,
        url: Option<String>,
    ) -> Result<Self, ServiceError> {
        match upload {
            Some(image) => Ok(Self { url: Some(store.put(image).await?), uploaded: true }),
            None => Ok(Self { url, uploaded: false }),
        }
    }

    pub fn url(&self) -> Option<String> { self.url.clone() }

    /// Pass `result` through; on failure a freshly stored upload is deleted.
    pub async fn settle<T>(self, store: &dyn ImageStore, result: Result<T, ServiceError>) -> Result<T, ServiceError> {
        if result.is_err() && self.uploaded {
            if let Some(url) = &self.url {
                if let Err(e) = store.remove(url).await {
                    warn!(%url, error = %e, "orphaned upload left behind");
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> UploadedImage {
        UploadedImage {
            field: "image".into(),
            file_name: None,
            content_type: "image/png".into(),
            bytes: vec![1u8; 8],
        }
    }

    fn temp_store() -> (LocalImageStore, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("cms-pending-{}", uuid::Uuid::new_v4()));
        (LocalImageStore::new(&dir, "/uploads", 1024), dir)
    }

    async fn files_in(dir: &std::path::Path) -> usize {
        let Ok(mut entries) = tokio::fs::read_dir(dir).await else { return 0 };
        let mut n = 0;
        while let Ok(Some(_)) = entries.next_entry().await {
            n += 1;
        }
        n
    }

    #[tokio::test]
    async fn failed_write_removes_the_stored_upload() {
        let (store, dir) = temp_store();
        let image = PendingImage::resolve(&store, Some(upload()), Some("https://ignored.example/x.png".into()))
            .await
            .unwrap();
        assert!(image.url().unwrap().starts_with("/uploads/"));
        assert_eq!(files_in(&dir).await, 1);

        let result: Result<(), _> = Err(ServiceError::Conflict("duplicate".into()));
        assert!(matches!(image.settle(&store, result).await, Err(ServiceError::Conflict(_))));
        assert_eq!(files_in(&dir).await, 0);
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn successful_write_keeps_the_upload() {
        let (store, dir) = temp_store();
        let image = PendingImage::resolve(&store, Some(upload()), None).await.unwrap();
        assert_eq!(image.settle(&store, Ok(7)).await.unwrap(), 7);
        assert_eq!(files_in(&dir).await, 1);
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn body_url_is_never_removed() {
        let (store, dir) = temp_store();
        let image = PendingImage::resolve(&store, None, Some("/uploads/kept.png".into())).await.unwrap();
        assert_eq!(image.url().as_deref(), Some("/uploads/kept.png"));
        let result: Result<(), _> = Err(ServiceError::not_found("Expert"));
        assert!(image.settle(&store, result).await.is_err());
        assert_eq!(files_in(&dir).await, 0);
    }
}
