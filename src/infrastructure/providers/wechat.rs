use crate::domain::entities::OpenIdentity;
use crate::domain::ports::identity_provider::IdentityProvider;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const WECHAT_PROVIDER: &str = "wechat";
pub const DEFAULT_CODE2SESSION_URL: &str = "https://api.weixin.qq.com/sns/jscode2session";

#[derive(Debug, Deserialize)]
struct Code2SessionResponse {
    #[serde(default)]
    openid: Option<String>,
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

/// Mini-program login: trades a `wx.login` code for the user's openid.
#[derive(Clone)]
pub struct WechatIdentityProvider {
    http_client: Client,
    app_id: String,
    app_secret: String,
    endpoint: String,
}

impl WechatIdentityProvider {
    pub fn new(app_id: String, app_secret: String, endpoint: String) -> ApiResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            app_id,
            app_secret,
            endpoint,
        })
    }
}

#[async_trait]
impl IdentityProvider for WechatIdentityProvider {
    fn provider(&self) -> &str {
        WECHAT_PROVIDER
    }

    async fn resolve(&self, code: &str) -> ApiResult<OpenIdentity> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[
                ("appid", self.app_id.as_str()),
                ("secret", self.app_secret.as_str()),
                ("js_code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("code2session request failed: {}", e);
                ApiError::Internal("Login service unavailable".to_string())
            })?;

        let body: Code2SessionResponse = response.json().await.map_err(|e| {
            tracing::error!("code2session returned an unreadable body: {}", e);
            ApiError::Internal("Login service unavailable".to_string())
        })?;

        match body.openid {
            Some(openid) if body.errcode == 0 && !openid.is_empty() => Ok(OpenIdentity {
                provider: WECHAT_PROVIDER.to_string(),
                openid,
                nickname: None,
                avatar: None,
            }),
            _ => {
                tracing::warn!(
                    "code2session rejected login code: errcode={}, errmsg={}",
                    body.errcode,
                    body.errmsg
                );
                Err(ApiError::Unauthorized)
            }
        }
    }
}
