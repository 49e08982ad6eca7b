use crate::domain::entities::{SubscribeRequest, Subscription};
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};
use axum::{extract::State, Json};

/// GET /api/subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<Subscription>> {
    let subscription = state.subscription_service.get(auth.id()).await?;
    Ok(Json(subscription))
}

/// PUT /api/subscription
pub async fn subscribe(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Json(req): Json<SubscribeRequest>,
) -> ApiResult<Json<Subscription>> {
    let subscription = state
        .subscription_service
        .subscribe(auth.id(), req)
        .await?;
    Ok(Json(subscription))
}
