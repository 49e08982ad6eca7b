use crate::domain::entities::Subscription;
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn get_subscription(&self, user_id: &str) -> ApiResult<Option<Subscription>>;

    async fn upsert_subscription(&self, user_id: &str, subscription: &Subscription)
        -> ApiResult<()>;
}
