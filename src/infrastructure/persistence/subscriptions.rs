use crate::domain::entities::Subscription;
use crate::domain::ports::subscription_repository::SubscriptionRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use sqlx::Row;

#[async_trait]
impl SubscriptionRepository for Database {
    async fn get_subscription(&self, user_id: &str) -> ApiResult<Option<Subscription>> {
        let row = sqlx::query("SELECT email, weekly, monthly FROM subscriptions WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = row {
            Ok(Some(Subscription {
                email: row.try_get("email")?,
                weekly: row.try_get::<i64, _>("weekly")? == 1,
                monthly: row.try_get::<i64, _>("monthly")? == 1,
            }))
        } else {
            Ok(None)
        }
    }

    async fn upsert_subscription(
        &self,
        user_id: &str,
        subscription: &Subscription,
    ) -> ApiResult<()> {
        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO subscriptions (user_id, email, weekly, monthly, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT (user_id) DO UPDATE SET
                 email = excluded.email,
                 weekly = excluded.weekly,
                 monthly = excluded.monthly,
                 updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(&subscription.email)
        .bind(subscription.weekly as i64)
        .bind(subscription.monthly as i64)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "Subscription saved: user={}, weekly={}, monthly={}",
            user_id,
            subscription.weekly,
            subscription.monthly
        );
        Ok(())
    }
}
