use crate::domain::entities::{image_extension, UploadedFile, MAX_UPLOAD_BYTES};
use crate::domain::ports::clock::Clock;
use crate::domain::ports::file_storage::FileStorage;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn FileStorage>,
    public_prefix: String,
    cdn_base_url: String,
    clock: Arc<dyn Clock>,
}

impl UploadService {
    pub fn new(
        storage: Arc<dyn FileStorage>,
        public_prefix: &str,
        cdn_base_url: &str,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            public_prefix: format!("/{}", public_prefix.trim_matches('/')),
            cdn_base_url: cdn_base_url.trim_end_matches('/').to_string(),
            clock,
        }
    }

    /// Store an image under `{YYYYMM}/{uuid}.{ext}`.
    pub async fn upload(&self, filename: &str, content: &[u8]) -> ApiResult<UploadedFile> {
        let ext = image_extension(filename).ok_or_else(|| {
            ApiError::BadRequest("Only jpg, jpeg, png and gif images are accepted".to_string())
        })?;

        if content.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
        }
        if content.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::BadRequest(format!(
                "Uploaded file exceeds {} bytes",
                MAX_UPLOAD_BYTES
            )));
        }

        let key = format!(
            "{}/{}.{}",
            self.clock.now().format("%Y%m"),
            Uuid::new_v4(),
            ext
        );
        self.storage.save(&key, content).await?;

        let url = format!("{}/{}", self.public_prefix, key);
        let cdn = if self.cdn_base_url.is_empty() {
            url.clone()
        } else {
            format!("{}{}", self.cdn_base_url, url)
        };

        tracing::info!("File uploaded: key={}, bytes={}", key, content.len());
        Ok(UploadedFile { url, cdn })
    }
}
