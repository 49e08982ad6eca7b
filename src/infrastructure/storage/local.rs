use crate::domain::ports::file_storage::FileStorage;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

#[derive(Clone)]
pub struct LocalFileStorage {
    base_path: PathBuf,
}

impl LocalFileStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a storage key under the base path. Only plain relative
    /// components are accepted.
    fn resolve_path(&self, path: &str) -> ApiResult<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !safe || relative.as_os_str().is_empty() {
            return Err(ApiError::BadRequest(format!("Invalid storage path: {}", path)));
        }

        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save(&self, path: &str, content: &[u8]) -> ApiResult<()> {
        let file_path = self.resolve_path(path)?;

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ApiError::Internal(format!("Failed to create directory: {}", e)))?;
        }

        fs::write(&file_path, content)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to write file: {}", e)))
    }

    async fn exists(&self, path: &str) -> ApiResult<bool> {
        let file_path = self.resolve_path(path)?;
        Ok(fs::try_exists(&file_path).await.unwrap_or(false))
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let file_path = self.resolve_path(path)?;
        if fs::try_exists(&file_path).await.unwrap_or(false) {
            fs::remove_file(&file_path)
                .await
                .map_err(|e| ApiError::Internal(format!("Failed to delete file: {}", e)))?;
        }
        Ok(())
    }
}
