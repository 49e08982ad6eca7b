use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_NICKNAME: &str = "Bookkeeper";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub nickname: String,
    pub avatar: String,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn new(nickname: Option<String>, avatar: Option<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        let nickname = nickname
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_NICKNAME.to_string());

        Self {
            id: Uuid::new_v4().to_string(),
            nickname,
            avatar: avatar.unwrap_or_default(),
            active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Link between a third-party login identity and a local user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAccount {
    pub provider: String,
    pub openid: String,
    pub user_id: String,
    pub created_at: String,
}

/// Identity resolved from a social-login code.
#[derive(Debug, Clone)]
pub struct OpenIdentity {
    pub provider: String,
    pub openid: String,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    pub token: String,
    pub expires_in: i64,
    pub issued_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub uid: String,
    pub nickname: String,
    pub avatar: String,
    pub token: TokenInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub nickname: String,
    pub avatar: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            nickname: user.nickname,
            avatar: user.avatar,
        }
    }
}
