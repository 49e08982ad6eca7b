use crate::application::services::lock_service::LockService;
use crate::application::services::token_service::TokenService;
use crate::domain::entities::{Book, LoginResponse, User, UserProfile, DEFAULT_BOOK_TITLE};
use crate::domain::ports::identity_provider::IdentityProvider;
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use std::sync::Arc;

const REGISTER_RESOURCE: &str = "user:register";

#[derive(Clone)]
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    identity_provider: Arc<dyn IdentityProvider>,
    tokens: TokenService,
    locks: LockService,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        identity_provider: Arc<dyn IdentityProvider>,
        tokens: TokenService,
        locks: LockService,
    ) -> Self {
        Self {
            user_repo,
            identity_provider,
            tokens,
            locks,
        }
    }

    /// Exchange a social-login code for an access token, registering the
    /// user with a default book on first login.
    pub async fn login(&self, code: &str) -> ApiResult<LoginResponse> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ApiError::BadRequest("Login code is required".to_string()));
        }

        let identity = self.identity_provider.resolve(code).await?;

        let user = match self
            .user_repo
            .find_user_by_open_account(&identity.provider, &identity.openid)
            .await?
        {
            Some(user) => user,
            None => {
                // Concurrent first logins of the same account race on registration
                let request = self.locks.request(&identity.openid, REGISTER_RESOURCE);
                self.locks
                    .with_lock(request, || async {
                        if let Some(user) = self
                            .user_repo
                            .find_user_by_open_account(&identity.provider, &identity.openid)
                            .await?
                        {
                            return Ok::<_, ApiError>(user);
                        }

                        let user = User::new(identity.nickname.clone(), identity.avatar.clone());
                        let book = Book::new(user.id.clone(), DEFAULT_BOOK_TITLE.to_string());
                        self.user_repo
                            .register_user(&user, &identity.provider, &identity.openid, &book)
                            .await?;
                        Ok(user)
                    })
                    .await?
            }
        };

        if !user.active {
            tracing::warn!("Login refused for disabled user {}", user.id);
            return Err(ApiError::Unauthorized);
        }

        let token = self.tokens.issue(&user.id)?;
        tracing::info!("User logged in: id={}", user.id);

        Ok(LoginResponse {
            uid: user.id,
            nickname: user.nickname,
            avatar: user.avatar,
            token,
        })
    }

    /// Resolve the active user behind an access token.
    pub async fn authenticate(&self, token: &str) -> ApiResult<User> {
        let user_id = self.tokens.verify(token)?;
        match self.user_repo.get_user_by_id(&user_id).await? {
            Some(user) if user.active => Ok(user),
            _ => Err(ApiError::Unauthorized),
        }
    }

    pub async fn profile(&self, user_id: &str) -> ApiResult<UserProfile> {
        self.user_repo
            .get_user_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", user_id)))
    }
}
