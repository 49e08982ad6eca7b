use crate::domain::entities::{LoginRequest, LoginResponse, UserProfile};
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};
use axum::{extract::State, Json};

/// POST /api/login - Exchange a mini-program login code for an access token
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let response = state.user_service.login(&req.code).await?;
    Ok(Json(response))
}

/// GET /api/me - Profile of the caller
pub async fn me(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<UserProfile>> {
    let profile = state.user_service.profile(auth.id()).await?;
    Ok(Json(profile))
}
