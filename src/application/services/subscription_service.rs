use crate::domain::entities::{normalize_email, SubscribeRequest, Subscription};
use crate::domain::ports::subscription_repository::SubscriptionRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use std::sync::Arc;

#[derive(Clone)]
pub struct SubscriptionService {
    subscription_repo: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionService {
    pub fn new(subscription_repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscription_repo }
    }

    pub async fn get(&self, user_id: &str) -> ApiResult<Subscription> {
        Ok(self
            .subscription_repo
            .get_subscription(user_id)
            .await?
            .unwrap_or_default())
    }

    pub async fn subscribe(&self, user_id: &str, request: SubscribeRequest) -> ApiResult<Subscription> {
        let subscription = Subscription {
            email: normalize_email(&request.email)?,
            weekly: request.weekly,
            monthly: request.monthly,
        };
        self.subscription_repo
            .upsert_subscription(user_id, &subscription)
            .await?;
        Ok(subscription)
    }
}
