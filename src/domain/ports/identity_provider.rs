use crate::domain::entities::OpenIdentity;
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

/// Exchanges a social-login code for the caller's open identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn provider(&self) -> &str;

    async fn resolve(&self, code: &str) -> ApiResult<OpenIdentity>;
}
