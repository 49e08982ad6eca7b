use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Save a file under a path relative to the storage root
    async fn save(&self, path: &str, content: &[u8]) -> ApiResult<()>;

    async fn exists(&self, path: &str) -> ApiResult<bool>;

    async fn delete(&self, path: &str) -> ApiResult<()>;
}
