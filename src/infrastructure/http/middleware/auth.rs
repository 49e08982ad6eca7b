use crate::domain::entities::User;
use crate::infrastructure::http::middleware::error::ApiError;
use crate::infrastructure::http::middleware::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Caller resolved from the bearer token, available to handlers as an
/// extension.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user: User,
}

impl AuthenticatedUser {
    pub fn id(&self) -> &str {
        &self.user.id
    }
}

/// Require `Authorization: Bearer <token>` and attach the caller.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let user = state.user_service.authenticate(&token).await?;

    request.extensions_mut().insert(AuthenticatedUser { user });
    Ok(next.run(request).await)
}
