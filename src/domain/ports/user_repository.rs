use crate::domain::entities::{Book, User};
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user_by_id(&self, id: &str) -> ApiResult<Option<User>>;

    async fn find_user_by_open_account(&self, provider: &str, openid: &str)
        -> ApiResult<Option<User>>;

    /// Create a user, link its open account and create its first book in one
    /// transaction.
    async fn register_user(
        &self,
        user: &User,
        provider: &str,
        openid: &str,
        first_book: &Book,
    ) -> ApiResult<()>;
}
